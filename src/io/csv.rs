use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::sim::state::SimulationState;

/// Write every recorded trajectory point as CSV.
///
/// Columns: time, body, name, x, y. `time` is seconds since playback began
/// (point `i` of a trail was recorded after `i` steps). `body` is the index
/// in insertion order.
pub fn write_trajectories<W: Write>(writer: &mut W, sim: &SimulationState) -> io::Result<()> {
    writeln!(writer, "time,body,name,x,y")?;

    let dt = sim.time_step();
    for (index, (body, trail)) in sim.bodies().iter().zip(sim.trajectories()).enumerate() {
        let name = escape(&body.name);
        for (i, p) in trail.iter().enumerate() {
            writeln!(
                writer,
                "{:.1},{},{},{:.6e},{:.6e}",
                i as f64 * dt,
                index,
                name,
                p.x,
                p.y,
            )?;
        }
    }

    Ok(())
}

/// Write trajectories to a CSV file at the given path.
pub fn write_trajectories_file(path: impl AsRef<Path>, sim: &SimulationState) -> io::Result<()> {
    let path = path.as_ref();
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectories(&mut file, sim)?;
    file.flush()?;
    info!(path = %path.display(), "wrote trajectories");
    Ok(())
}

/// Quote a field containing a separator or quote.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodySpec;
    use nalgebra::Vector2;

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut sim = SimulationState::default();
        sim.add_body(BodySpec::new("Star, A", 1.0e30, Vector2::zeros(), Vector2::zeros(), "#FFFFFF"))
            .unwrap();
        sim.add_body(BodySpec::new(
            "Planet",
            1.0e24,
            Vector2::new(1.0e11, 0.0),
            Vector2::new(0.0, 3.0e4),
            "#FFFFFF",
        ))
        .unwrap();
        sim.enter_playback().unwrap();
        sim.advance_one_step().unwrap();
        sim.advance_one_step().unwrap();

        let mut buf = Vec::new();
        write_trajectories(&mut buf, &sim).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "time,body,name,x,y");
        assert_eq!(lines.len(), 1 + 2 * 3); // header + 3 points per body
        assert!(lines[1].starts_with("0.0,0,\"Star, A\","), "got {}", lines[1]);
        assert!(lines[6].starts_with("7200.0,1,Planet,"), "got {}", lines[6]);
    }

    #[test]
    fn authoring_state_writes_header_only() {
        let sim = SimulationState::default();
        let mut buf = Vec::new();
        write_trajectories(&mut buf, &sim).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "time,body,name,x,y\n");
    }
}
