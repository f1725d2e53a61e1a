use itertools::Itertools;

use crate::domain::Span;

/// Column assignment for one overlap group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedGroup {
    /// `(position into spans, column)` in placement order.
    pub assignments: Vec<(usize, usize)>,
    /// Columns opened while packing; every member reports this width.
    pub columns: usize,
}

/// Greedy first-fit packing of a single group.
///
/// Members are visited by start, then end, then input index, and each lands
/// in the leftmost column whose latest occupant it does not overlap.
pub fn pack_columns(spans: &[Span], group: &[usize]) -> PackedGroup {
    let ordered = group
        .iter()
        .copied()
        .sorted_by_key(|&position| {
            let span = &spans[position];
            (span.start, span.end, span.index)
        })
        .collect_vec();

    let mut column_tails: Vec<Span> = Vec::new();
    let mut assignments = Vec::with_capacity(ordered.len());

    for position in ordered {
        let span = spans[position];
        let free = column_tails.iter().position(|tail| !tail.overlaps(&span));

        let column = match free {
            Some(column) => {
                column_tails[column] = span;
                column
            }
            None => {
                column_tails.push(span);
                column_tails.len() - 1
            }
        };
        assignments.push((position, column));
    }

    PackedGroup {
        assignments,
        columns: column_tails.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(times: &[(u32, u32)]) -> Vec<Span> {
        times
            .iter()
            .enumerate()
            .map(|(index, &(start, end))| Span { index, start, end })
            .collect()
    }

    fn column_of(packed: &PackedGroup, position: usize) -> usize {
        packed
            .assignments
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, column)| *column)
            .unwrap()
    }

    #[test]
    fn test_nested_blocks_share_second_column() {
        let spans = spans(&[(540, 720), (570, 600), (600, 660)]);
        let packed = pack_columns(&spans, &[0, 1, 2]);

        assert_eq!(packed.columns, 2);
        assert_eq!(column_of(&packed, 0), 0);
        assert_eq!(column_of(&packed, 1), 1);
        assert_eq!(column_of(&packed, 2), 1);
    }

    #[test]
    fn test_packing_follows_start_order_not_input_order() {
        let spans = spans(&[(600, 660), (540, 720), (570, 600)]);
        let packed = pack_columns(&spans, &[0, 1, 2]);

        assert_eq!(packed.columns, 2);
        assert_eq!(column_of(&packed, 1), 0);
        assert_eq!(column_of(&packed, 2), 1);
        assert_eq!(column_of(&packed, 0), 1);
    }

    #[test]
    fn test_identical_spans_break_ties_by_input_index() {
        let spans = spans(&[(540, 600), (540, 600), (540, 600)]);
        let packed = pack_columns(&spans, &[2, 0, 1]);

        assert_eq!(packed.columns, 3);
        assert_eq!(column_of(&packed, 0), 0);
        assert_eq!(column_of(&packed, 1), 1);
        assert_eq!(column_of(&packed, 2), 2);
    }

    #[test]
    fn test_shorter_end_wins_equal_start() {
        let spans = spans(&[(540, 660), (540, 570)]);
        let packed = pack_columns(&spans, &[0, 1]);

        assert_eq!(column_of(&packed, 1), 0);
        assert_eq!(column_of(&packed, 0), 1);
    }

    #[test]
    fn test_no_column_holds_overlapping_spans() {
        let spans = spans(&[
            (540, 600),
            (550, 640),
            (560, 580),
            (590, 700),
            (600, 610),
            (605, 615),
            (620, 720),
            (640, 650),
        ]);
        let group: Vec<usize> = (0..spans.len()).collect();
        let packed = pack_columns(&spans, &group);

        for (a, col_a) in &packed.assignments {
            assert!(*col_a < packed.columns);
            for (b, col_b) in &packed.assignments {
                if a != b && col_a == col_b {
                    assert!(!spans[*a].overlaps(&spans[*b]));
                }
            }
        }
    }
}
