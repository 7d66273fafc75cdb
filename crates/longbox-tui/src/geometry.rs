// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

use longbox_app::{PosterSize, ShowOptions};

/// Resolved poster-grid measurements for one container width. Pure
/// arithmetic: the same inputs always produce the same geometry, so
/// scroll positions survive redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub column_count: u16,
    pub column_width: u16,
    pub row_height: u16,
}

impl GridGeometry {
    /// The grid fits as many fixed-maximum columns as the width allows.
    /// When the width divides evenly the cells keep their maximum width;
    /// otherwise up to `extra_column_allowance` more columns are
    /// squeezed in so cells shrink instead of leaving a wide right
    /// gutter. Row height is composed from the poster, the enabled
    /// labels, the progress bar, and one extra line when the active
    /// sort value is not already shown.
    pub fn compute(
        width: u16,
        size: PosterSize,
        options: &ShowOptions,
        sort_line: bool,
    ) -> Self {
        let base_columns = (width / size.max_column_width()).max(1);
        let column_count = if width % size.max_column_width() == 0 {
            base_columns
        } else {
            base_columns + size.extra_column_allowance()
        };
        let column_width = (width / column_count).max(1);

        let row_height = size.poster_height()
            + options.label_line_count()
            + options.progress_height()
            + u16::from(sort_line);

        Self {
            column_count,
            column_width,
            row_height,
        }
    }

    /// Grid row containing the item at `index` in the current order.
    pub fn row_of_index(&self, index: usize) -> usize {
        index / self.column_count as usize
    }

    pub fn row_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.column_count as usize)
    }
}

/// Uniform-height virtual window: only rows intersecting the viewport
/// are handed to the renderer. Both views and the jump bar drive the
/// same interface.
pub trait VirtualWindow {
    /// Record the viewport height and total row count, clamping the
    /// current offset if the content shrank.
    fn measure(&mut self, viewport_height: u16, total_rows: usize);

    /// Scroll the minimum distance needed to make `row` fully visible.
    fn scroll_to(&mut self, row: usize);

    /// Rows to render, half-open. Empty when there is nothing to show.
    fn visible_range(&self) -> Range<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    row_height: u16,
    viewport_height: u16,
    total_rows: usize,
    offset: usize,
}

impl RowWindow {
    pub fn new(row_height: u16) -> Self {
        Self {
            row_height: row_height.max(1),
            viewport_height: 0,
            total_rows: 0,
            offset: 0,
        }
    }

    pub fn set_row_height(&mut self, row_height: u16) {
        self.row_height = row_height.max(1);
        self.clamp_offset();
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
        self.clamp_offset();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let next = self.offset as isize + delta;
        self.offset = next.max(0) as usize;
        self.clamp_offset();
    }

    /// Whole rows that fit the viewport. At least one row once any
    /// height is available, so tiny terminals still show content.
    pub fn rows_per_viewport(&self) -> usize {
        if self.viewport_height == 0 {
            return 0;
        }
        ((self.viewport_height / self.row_height) as usize).max(1)
    }

    fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.rows_per_viewport().max(1))
    }

    fn clamp_offset(&mut self) {
        if self.offset > self.max_offset() {
            self.offset = self.max_offset();
        }
    }
}

impl VirtualWindow for RowWindow {
    fn measure(&mut self, viewport_height: u16, total_rows: usize) {
        self.viewport_height = viewport_height;
        self.total_rows = total_rows;
        self.clamp_offset();
    }

    fn scroll_to(&mut self, row: usize) {
        let visible = self.rows_per_viewport();
        if visible == 0 {
            self.offset = row.min(self.total_rows.saturating_sub(1));
            return;
        }
        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + visible {
            self.offset = row + 1 - visible;
        }
        self.clamp_offset();
    }

    fn visible_range(&self) -> Range<usize> {
        if self.total_rows == 0 || self.viewport_height == 0 {
            return 0..0;
        }
        let end = (self.offset + self.rows_per_viewport()).min(self.total_rows);
        self.offset..end
    }
}
