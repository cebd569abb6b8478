use std::io::{stdout, Stdout, Write};

use crossbeam_channel::Receiver;
use crossterm::{cursor, terminal, ExecutableCommand, Result};
use log::warn;

use shared_resources::elevator_message::{CarSnapshot, StopOrigin};

/// Live table of every car, redrawn in place on stdout. Stops are listed
/// in service order, suffixed `h` when wanted from the hall and `c` when
/// selected in the car.
pub struct StatusView {
    stdout: Stdout,
    lines_drawn: u16,
}

impl StatusView {
    pub fn new() -> Self {
        StatusView {
            stdout: stdout(),
            lines_drawn: 0,
        }
    }

    pub fn print_status(&mut self, snapshots: &[CarSnapshot]) -> Result<()> {
        if self.lines_drawn > 0 {
            self.stdout.execute(cursor::MoveUp(self.lines_drawn))?;
        }
        self.stdout.execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;

        let rows = status_rows(snapshots);
        for row in rows.iter() {
            writeln!(self.stdout, "{}", row)?;
        }
        self.stdout.flush()?;
        self.lines_drawn = u16::try_from(rows.len()).unwrap_or(u16::MAX);
        Ok(())
    }
}

impl Default for StatusView {
    fn default() -> Self {
        StatusView::new()
    }
}

const SEPARATOR: &str = "+-----+-------+-------------+----------+-------+----------------------+";

pub fn status_rows(snapshots: &[CarSnapshot]) -> Vec<String> {
    let mut rows = vec![
        SEPARATOR.to_string(),
        format!(
            "| {0:<3} | {1:<5} | {2:<11} | {3:<8} | {4:<5} | {5:<20} |",
            "CAR", "FLOOR", "MOTION", "DOOR", "DIR", "STOPS"
        ),
        SEPARATOR.to_string(),
    ];
    for snapshot in snapshots {
        let stops = snapshot
            .stops
            .iter()
            .map(|floor| match snapshot.stop_origins.get(floor) {
                Some(StopOrigin::Outside) => format!("{}h", floor),
                _ => format!("{}c", floor),
            })
            .collect::<Vec<_>>()
            .join(",");
        rows.push(format!(
            "| {0:<3} | {1:<5} | {2:<11} | {3:<8} | {4:<5} | {5:<20} |",
            snapshot.id,
            snapshot.current_floor,
            snapshot.motion,
            snapshot.door,
            snapshot.committed_direction,
            stops
        ));
    }
    rows.push(SEPARATOR.to_string());
    rows
}

/// Redraws the table for every snapshot received until the channel closes.
pub fn main(snapshot_rx: Receiver<Vec<CarSnapshot>>) {
    let mut view = StatusView::new();
    for snapshots in snapshot_rx.iter() {
        if let Err(e) = view.print_status(&snapshots) {
            warn!("Unable to draw status view: {}", e);
        }
    }
}
