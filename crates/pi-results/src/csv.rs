//! CSV export of stored trajectories.

use crate::types::TrajectoryRecord;
use std::io::Write;

pub const CSV_HEADER: &str = "time_s,x,u_raw,u,r,setpoint,load";

pub fn write_csv<W: Write>(mut writer: W, records: &[TrajectoryRecord]) -> std::io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for rec in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            rec.time_s, rec.x, rec.u_raw, rec.u, rec.r, rec.setpoint, rec.load
        )?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows() {
        let records = [
            TrajectoryRecord {
                time_s: 0.0,
                x: 0.0,
                u_raw: 0.0,
                u: 0.0,
                r: 0.0,
                setpoint: 1.0,
                load: 0.0,
            },
            TrajectoryRecord {
                time_s: 0.5,
                x: 0.25,
                u_raw: 1.5,
                u: 1.0,
                r: 0.5,
                setpoint: 1.0,
                load: 0.0,
            },
        ];
        let mut out = Vec::new();
        write_csv(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[2], "0.5,0.25,1.5,1,0.5,1,0");
    }
}
