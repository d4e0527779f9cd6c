//! Neighborhood definitions for windowed statistics

/// Square neighborhood of a given radius around a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighborhood {
    radius: usize,
}

impl Neighborhood {
    /// Square window of `2 * radius + 1` cells per side
    pub fn square(radius: usize) -> Self {
        Self { radius }
    }

    /// Get the size of the neighborhood (width and height)
    pub fn size(&self) -> usize {
        self.radius * 2 + 1
    }

    /// Relative positions in this neighborhood, center included
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let r = self.radius as isize;
        let mut offsets = Vec::with_capacity(self.size() * self.size());

        for dr in -r..=r {
            for dc in -r..=r {
                offsets.push((dr, dc));
            }
        }

        offsets
    }

    /// Absolute positions of the neighborhood around (row, col) that fall
    /// inside a `rows` x `cols` grid. Out-of-grid positions are skipped, never
    /// padded.
    pub fn cells_within(
        offsets: &[(isize, isize)],
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        offsets.iter().filter_map(move |&(dr, dc)| {
            let nr = row as isize + dr;
            let nc = col as isize + dc;
            if nr >= 0 && nc >= 0 && (nr as usize) < rows && (nc as usize) < cols {
                Some((nr as usize, nc as usize))
            } else {
                None
            }
        })
    }
}
