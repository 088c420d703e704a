//! Overlap clustering and column assignment.

use chrono::{DateTime, Utc};

/// Where an event sits inside its cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub column: usize,
    /// Number of columns used by the event's cluster
    pub columns: usize,
}

/// Assign a column to each `(start, end)` interval.
///
/// `intervals` must be sorted by start. An interval joins the current cluster
/// while it starts strictly before the latest end seen in that cluster, so a
/// cluster is the transitive closure of overlaps. Inside a cluster each
/// interval takes the lowest column whose previous occupant has ended.
pub fn assign_columns(intervals: &[(DateTime<Utc>, DateTime<Utc>)]) -> Vec<Placement> {
    let mut placements = vec![
        Placement {
            column: 0,
            columns: 1,
        };
        intervals.len()
    ];

    let mut cluster_start = 0;
    let mut cluster_end: Option<DateTime<Utc>> = None;
    // End of the last interval placed in each column of the current cluster
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();

    for (i, &(start, end)) in intervals.iter().enumerate() {
        if cluster_end.is_some_and(|cluster_end| start >= cluster_end) {
            close_cluster(&mut placements[cluster_start..i], column_ends.len());
            cluster_start = i;
            column_ends.clear();
            cluster_end = None;
        }

        let column = match column_ends.iter().position(|&free_at| free_at <= start) {
            Some(column) => {
                column_ends[column] = end;
                column
            }
            None => {
                column_ends.push(end);
                column_ends.len() - 1
            }
        };
        placements[i].column = column;

        cluster_end = Some(cluster_end.map_or(end, |current| current.max(end)));
    }

    close_cluster(&mut placements[cluster_start..], column_ends.len());
    placements
}

fn close_cluster(cluster: &mut [Placement], columns: usize) {
    for placement in cluster {
        placement.columns = columns.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    fn placement(column: usize, columns: usize) -> Placement {
        Placement { column, columns }
    }

    #[test]
    fn test_disjoint_intervals_get_full_width() {
        let placements = assign_columns(&[
            (at(9, 0), at(10, 0)),
            (at(10, 0), at(11, 0)),
            (at(13, 0), at(14, 0)),
        ]);
        assert_eq!(placements, vec![placement(0, 1); 3]);
    }

    #[test]
    fn test_pairwise_overlap_splits_cluster() {
        let placements = assign_columns(&[(at(9, 0), at(10, 0)), (at(9, 30), at(10, 30))]);
        assert_eq!(placements, vec![placement(0, 2), placement(1, 2)]);
    }

    #[test]
    fn test_cluster_is_transitive_and_reuses_columns() {
        // a overlaps b, b overlaps c, a does not overlap c
        let placements = assign_columns(&[
            (at(9, 0), at(10, 0)),
            (at(9, 30), at(11, 0)),
            (at(10, 0), at(10, 30)),
        ]);
        assert_eq!(
            placements,
            vec![placement(0, 2), placement(1, 2), placement(0, 2)]
        );
    }

    #[test]
    fn test_long_event_keeps_cluster_open() {
        let placements = assign_columns(&[
            (at(8, 0), at(12, 0)),
            (at(9, 0), at(9, 30)),
            (at(11, 0), at(11, 30)),
            (at(12, 0), at(13, 0)),
        ]);
        assert_eq!(
            placements,
            vec![
                placement(0, 2),
                placement(1, 2),
                placement(1, 2),
                placement(0, 1)
            ]
        );
    }

    #[test]
    fn test_three_way_overlap() {
        let placements = assign_columns(&[
            (at(9, 0), at(10, 0)),
            (at(9, 0), at(10, 0)),
            (at(9, 15), at(9, 45)),
        ]);
        assert_eq!(
            placements,
            vec![placement(0, 3), placement(1, 3), placement(2, 3)]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(assign_columns(&[]).is_empty());
    }
}
