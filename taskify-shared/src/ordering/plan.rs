/// Pure renumbering planner
///
/// Given the current id sequence of the affected column(s), the moved task
/// and the requested index, these functions compute the complete set of
/// `(task_id, order_index)` writes that restore the column invariant:
/// indexes are exactly `0..len`, in display order, no gaps or duplicates.
///
/// No I/O happens here; the engine feeds these plans to the database inside
/// a transaction.

use uuid::Uuid;

/// A single `order_index` assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWrite {
    /// Task to update
    pub task_id: Uuid,

    /// Its new position
    pub order_index: i32,
}

/// Writes for a move between two columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Renumbering of the source column after removal (gap closed)
    pub source: Vec<IndexWrite>,

    /// Renumbering of the destination column with the task inserted
    /// (includes the moved task itself)
    pub dest: Vec<IndexWrite>,

    /// The moved task's final position in the destination column
    pub final_index: i32,
}

/// Clamps a requested position into `[0, len]`
///
/// Requests past the end append; negative requests go to the front.
pub fn clamp_index(requested: i32, len: usize) -> usize {
    if requested < 0 {
        0
    } else {
        (requested as usize).min(len)
    }
}

/// Sequential renumbering of an id sequence, in order
fn renumber(ids: &[Uuid]) -> Vec<IndexWrite> {
    ids.iter()
        .enumerate()
        .map(|(position, &task_id)| IndexWrite {
            task_id,
            order_index: position as i32,
        })
        .collect()
}

/// Plans a reorder within one column
///
/// `column` is the column's current id sequence (including the task).
/// The task is removed, re-inserted at the clamped requested position and
/// the whole column is renumbered.
///
/// Returns `None` if the task is not in the column; the caller read a
/// stale column snapshot.
pub fn plan_reorder(column: &[Uuid], task_id: Uuid, requested_index: i32) -> Option<Vec<IndexWrite>> {
    if !column.contains(&task_id) {
        return None;
    }

    let mut sequence: Vec<Uuid> = column.iter().copied().filter(|&id| id != task_id).collect();
    let position = clamp_index(requested_index, sequence.len());
    sequence.insert(position, task_id);

    Some(renumber(&sequence))
}

/// Plans a move from one column to another
///
/// `source_without_task` and `dest_without_task` are the two columns' id
/// sequences with the moved task already excluded. The source is
/// renumbered to close the gap; the task is inserted into the destination
/// at the clamped requested position and the destination is renumbered.
pub fn plan_move(
    source_without_task: &[Uuid],
    dest_without_task: &[Uuid],
    task_id: Uuid,
    requested_index: i32,
) -> MovePlan {
    let source = renumber(source_without_task);

    let mut dest_sequence: Vec<Uuid> = dest_without_task.to_vec();
    let position = clamp_index(requested_index, dest_sequence.len());
    dest_sequence.insert(position, task_id);

    MovePlan {
        source,
        dest: renumber(&dest_sequence),
        final_index: position as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn indexes_of(writes: &[IndexWrite]) -> Vec<i32> {
        writes.iter().map(|w| w.order_index).collect()
    }

    fn assert_contiguous(writes: &[IndexWrite]) {
        let expected: Vec<i32> = (0..writes.len() as i32).collect();
        assert_eq!(indexes_of(writes), expected);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(0, 3), 0);
        assert_eq!(clamp_index(2, 3), 2);
        assert_eq!(clamp_index(3, 3), 3);
        assert_eq!(clamp_index(9999, 3), 3);
        assert_eq!(clamp_index(-1, 3), 0);
        assert_eq!(clamp_index(5, 0), 0);
    }

    #[test]
    fn test_reorder_moves_task_to_requested_position() {
        // Column "InProgress" has [X(0), Y(1), Z(2)]; reorder X to index 2.
        let column = ids(3);
        let (x, y, z) = (column[0], column[1], column[2]);

        let writes = plan_reorder(&column, x, 2).unwrap();

        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0], IndexWrite { task_id: y, order_index: 0 });
        assert_eq!(writes[1], IndexWrite { task_id: z, order_index: 1 });
        assert_eq!(writes[2], IndexWrite { task_id: x, order_index: 2 });
    }

    #[test]
    fn test_reorder_to_current_index_is_identity() {
        let column = ids(4);

        for (position, &task_id) in column.iter().enumerate() {
            let writes = plan_reorder(&column, task_id, position as i32).unwrap();
            let order: Vec<Uuid> = writes.iter().map(|w| w.task_id).collect();
            assert_eq!(order, column, "reordering to own index must not shuffle");
            assert_contiguous(&writes);
        }
    }

    #[test]
    fn test_reorder_clamps_past_the_end() {
        // Requesting index 9999 on a column of size 3 lands the task last.
        let column = ids(3);
        let first = column[0];

        let writes = plan_reorder(&column, first, 9999).unwrap();

        assert_contiguous(&writes);
        assert_eq!(writes.last().unwrap().task_id, first);
        assert_eq!(writes.last().unwrap().order_index, 2);
    }

    #[test]
    fn test_reorder_clamps_negative_to_front(){
        let column = ids(3);
        let last = column[2];

        let writes = plan_reorder(&column, last, -5).unwrap();

        assert_eq!(writes[0].task_id, last);
        assert_contiguous(&writes);
    }

    #[test]
    fn test_reorder_rejects_task_not_in_column() {
        let column = ids(3);
        assert!(plan_reorder(&column, Uuid::new_v4(), 1).is_none());
    }

    #[test]
    fn test_reorder_invariant_holds_for_every_target() {
        let column = ids(5);
        for &task_id in &column {
            for requested in -2..8 {
                let writes = plan_reorder(&column, task_id, requested).unwrap();
                assert_eq!(writes.len(), column.len());
                assert_contiguous(&writes);

                let mut seen: Vec<Uuid> = writes.iter().map(|w| w.task_id).collect();
                seen.sort();
                let mut expected = column.clone();
                expected.sort();
                assert_eq!(seen, expected, "no task lost or duplicated");
            }
        }
    }

    #[test]
    fn test_move_into_empty_column() {
        // ToDo has [A(0), B(1), C(2)]; move B to empty InProgress at 0.
        let source = ids(3);
        let (a, b, c) = (source[0], source[1], source[2]);
        let source_without_b: Vec<Uuid> = vec![a, c];

        let plan = plan_move(&source_without_b, &[], b, 0);

        assert_eq!(plan.source, vec![
            IndexWrite { task_id: a, order_index: 0 },
            IndexWrite { task_id: c, order_index: 1 },
        ]);
        assert_eq!(plan.dest, vec![IndexWrite { task_id: b, order_index: 0 }]);
        assert_eq!(plan.final_index, 0);
    }

    #[test]
    fn test_move_conserves_counts() {
        // Moving T from a column of size a to a column of size b yields
        // sizes a-1 and b+1, both contiguous, with T exactly once.
        let source = ids(4);
        let dest = ids(3);
        let moved = source[2];
        let source_without: Vec<Uuid> =
            source.iter().copied().filter(|&id| id != moved).collect();

        let plan = plan_move(&source_without, &dest, moved, 1);

        assert_eq!(plan.source.len(), 3);
        assert_eq!(plan.dest.len(), 4);
        assert_contiguous(&plan.source);
        assert_contiguous(&plan.dest);

        let occurrences = plan
            .dest
            .iter()
            .filter(|w| w.task_id == moved)
            .count();
        assert_eq!(occurrences, 1);
        assert!(plan.source.iter().all(|w| w.task_id != moved));
    }

    #[test]
    fn test_move_inserts_at_requested_position() {
        let dest = ids(3);
        let moved = Uuid::new_v4();

        let plan = plan_move(&[], &dest, moved, 1);

        assert_eq!(plan.dest[1].task_id, moved);
        assert_eq!(plan.final_index, 1);
        assert_contiguous(&plan.dest);
    }

    #[test]
    fn test_move_clamps_past_the_end() {
        let dest = ids(2);
        let moved = Uuid::new_v4();

        let plan = plan_move(&[], &dest, moved, 50);

        assert_eq!(plan.final_index, 2);
        assert_eq!(plan.dest.last().unwrap().task_id, moved);
        assert_contiguous(&plan.dest);
    }
}
