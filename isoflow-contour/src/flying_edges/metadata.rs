//! Per-row bookkeeping shared by the four passes

/// Classification of one x-edge against the isovalue
///
/// Bit 0 is the left sample, bit 1 the right sample; a sample counts as above
/// when it is greater than or equal to the isovalue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum XEdgeState {
    #[default]
    Below = 0,
    LeftAbove = 1,
    RightAbove = 2,
    BothAbove = 3,
}

impl XEdgeState {
    /// Classify the edge between samples `s0` (left) and `s1` (right)
    #[inline]
    pub fn classify(s0: f64, s1: f64, value: f64) -> Self {
        match (s0 >= value, s1 >= value) {
            (false, false) => XEdgeState::Below,
            (true, false) => XEdgeState::LeftAbove,
            (false, true) => XEdgeState::RightAbove,
            (true, true) => XEdgeState::BothAbove,
        }
    }

    /// Exactly one endpoint is above
    #[inline]
    pub fn is_crossing(self) -> bool {
        matches!(self, XEdgeState::LeftAbove | XEdgeState::RightAbove)
    }

    #[inline]
    pub fn left_above(self) -> bool {
        self as u8 & 1 != 0
    }

    #[inline]
    pub fn right_above(self) -> bool {
        self as u8 & 2 != 0
    }
}

/// Combine the four x-edges bounding a voxel into its 8-bit case code
///
/// `rows` are the x-edge states of rows `(j, k)`, `(j + 1, k)`, `(j, k + 1)`
/// and `(j + 1, k + 1)`.
#[inline]
pub fn case_code(rows: &[&[XEdgeState]; 4], i: usize) -> u8 {
    rows[0][i] as u8
        | (rows[1][i] as u8) << 2
        | (rows[2][i] as u8) << 4
        | (rows[3][i] as u8) << 6
}

/// Metadata for one x-row of the volume
///
/// Passes 1 and 2 fill in counts; the prefix sum then replaces the four
/// counts with the offsets where the row's output begins. The row's x-, y-
/// and z-edge points are stored contiguously in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeMetaData {
    pub x_points: usize,
    pub y_points: usize,
    pub z_points: usize,
    pub triangles: usize,
    /// First voxel that may hold contour
    pub trim_left: usize,
    /// One past the last voxel that may hold contour
    pub trim_right: usize,
}

impl EdgeMetaData {
    /// Zero counts and an empty trim range for a row of `x_cells` edges
    pub fn empty(x_cells: usize) -> Self {
        Self {
            trim_left: x_cells,
            trim_right: 0,
            ..Default::default()
        }
    }

    /// Union of the trim ranges of the four rows bounding a voxel row
    pub fn union_trim(rows: [&EdgeMetaData; 4]) -> (usize, usize) {
        rows.iter().fold((usize::MAX, 0), |(left, right), row| {
            (left.min(row.trim_left), right.max(row.trim_right))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ties_count_as_above() {
        assert_eq!(XEdgeState::classify(1.0, 1.0, 1.0), XEdgeState::BothAbove);
        assert_eq!(XEdgeState::classify(1.0, 0.5, 1.0), XEdgeState::LeftAbove);
        assert_eq!(XEdgeState::classify(0.5, 1.0, 1.0), XEdgeState::RightAbove);
        assert_eq!(XEdgeState::classify(0.5, 0.9, 1.0), XEdgeState::Below);
        assert!(XEdgeState::LeftAbove.is_crossing());
        assert!(!XEdgeState::BothAbove.is_crossing());
        assert!(XEdgeState::BothAbove.left_above() && XEdgeState::BothAbove.right_above());
    }

    #[test]
    fn test_case_code_bit_layout() {
        use XEdgeState::*;
        let r0 = [LeftAbove];
        let r1 = [RightAbove];
        let r2 = [Below];
        let r3 = [BothAbove];
        // corners 0, 3, 6 and 7 above
        assert_eq!(case_code(&[&r0, &r1, &r2, &r3], 0), 0b1100_1001);
    }

    #[test]
    fn test_union_trim() {
        let a = EdgeMetaData { trim_left: 3, trim_right: 5, ..Default::default() };
        let b = EdgeMetaData { trim_left: 1, trim_right: 4, ..Default::default() };
        let empty = EdgeMetaData::empty(9);
        assert_eq!(EdgeMetaData::union_trim([&a, &b, &empty, &empty]), (1, 5));
        assert_eq!(EdgeMetaData::union_trim([&empty; 4]), (9, 0));
    }
}
