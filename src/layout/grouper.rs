use crate::domain::Span;

/// Partitions `spans` into connected overlap clusters.
///
/// Each cluster holds positions into `spans`. Two spans share a cluster when
/// a chain of pairwise overlaps links them, so members need not all overlap
/// one another. Clusters come out in the order they were last merged into.
pub fn group_overlaps(spans: &[Span]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (position, span) in spans.iter().enumerate() {
        let (matched, untouched): (Vec<Vec<usize>>, Vec<Vec<usize>>) =
            groups
                .into_iter()
                .partition(|group| group.iter().any(|&member| spans[member].overlaps(span)));

        let mut merged: Vec<usize> = matched.into_iter().flatten().collect();
        merged.push(position);

        groups = untouched;
        groups.push(merged);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(index: usize, start: u32, end: u32) -> Span {
        Span { index, start, end }
    }

    fn sorted(mut groups: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        for group in groups.iter_mut() {
            group.sort_unstable();
        }
        groups.sort();
        groups
    }

    #[test]
    fn test_touching_spans_stay_apart() {
        let spans = [span(0, 540, 600), span(1, 600, 660)];
        assert_eq!(sorted(group_overlaps(&spans)), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_chain_links_non_overlapping_ends() {
        // 0 and 2 never overlap, but both overlap 1.
        let spans = [span(0, 540, 600), span(1, 590, 650), span(2, 640, 700)];
        assert_eq!(sorted(group_overlaps(&spans)), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_late_bridge_merges_existing_groups() {
        let spans = [
            span(0, 540, 600),
            span(1, 660, 720),
            span(2, 800, 860),
            span(3, 590, 670),
        ];
        assert_eq!(sorted(group_overlaps(&spans)), vec![vec![0, 1, 3], vec![2]]);
    }

    #[test]
    fn test_membership_ignores_input_order() {
        let forward = [
            span(0, 540, 600),
            span(1, 590, 650),
            span(2, 640, 700),
            span(3, 900, 960),
        ];
        let reversed: Vec<Span> = forward.iter().rev().copied().collect();

        let forward_ids: Vec<Vec<usize>> = group_overlaps(&forward)
            .into_iter()
            .map(|g| g.into_iter().map(|p| forward[p].index).collect())
            .collect();
        let reversed_ids: Vec<Vec<usize>> = group_overlaps(&reversed)
            .into_iter()
            .map(|g| g.into_iter().map(|p| reversed[p].index).collect())
            .collect();

        assert_eq!(sorted(forward_ids), sorted(reversed_ids));
    }

    #[test]
    fn test_empty_input_has_no_groups() {
        assert!(group_overlaps(&[]).is_empty());
    }
}
