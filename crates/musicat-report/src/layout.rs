//! Page layout for the paginated document.
//!
//! [`PageCursor`] is a pure state machine over `(page, line)`; [`plan`] walks a
//! bundle with it and produces every positioned line, so pagination can be
//! checked without a PDF backend.

use crate::sections::{ReportBundle, ReportRow, SectionInfo, SectionSink};
use crate::text::{printable_ascii_lossy, truncate_chars};

pub const DOCUMENT_TITLE: &str = "Music catalog report";
pub const EMPTY_SECTION: &str = "No data";

/// Approximate advance of one body glyph, in millimetres.
const BODY_CHAR_WIDTH_MM: f32 = 1.6;

/// Physical page and text area, all in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub left_mm: f32,
    /// Baseline of the first line on a page.
    pub top_mm: f32,
    /// No baseline may sit below this.
    pub bottom_mm: f32,
    pub line_height_mm: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
        left_mm: 20.0,
        top_mm: 277.0,
        bottom_mm: 20.0,
        line_height_mm: 6.0,
    };

    pub fn lines_per_page(&self) -> usize {
        ((self.top_mm - self.bottom_mm) / self.line_height_mm).floor() as usize + 1
    }

    pub fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.left_mm
    }

    pub fn line_y_mm(&self, line: usize) -> f32 {
        self.top_mm - line as f32 * self.line_height_mm
    }
}

/// Position of the next line to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCursor {
    pub page: usize,
    /// Index of the next free line on `page`.
    pub line: usize,
}

impl PageCursor {
    pub fn remaining_lines(self, geometry: &PageGeometry) -> usize {
        geometry.lines_per_page().saturating_sub(self.line)
    }

    pub fn fits(self, geometry: &PageGeometry, lines: usize) -> bool {
        lines <= self.remaining_lines(geometry)
    }

    pub fn at_page_top(self) -> bool {
        self.line == 0
    }

    pub fn new_page(self) -> PageCursor {
        PageCursor {
            page: self.page + 1,
            line: 0,
        }
    }

    /// Where the next line lands, and the cursor after it.
    pub fn emit_line(self, geometry: &PageGeometry) -> (PageCursor, PageCursor) {
        let at = if self.fits(geometry, 1) {
            self
        } else {
            self.new_page()
        };
        let next = PageCursor {
            page: at.page,
            line: at.line + 1,
        };
        (at, next)
    }

    /// Break the page unless `lines` more fit. A fresh page never breaks.
    pub fn reserve(self, geometry: &PageGeometry, lines: usize) -> PageCursor {
        if self.at_page_top() || self.fits(geometry, lines) {
            self
        } else {
            self.new_page()
        }
    }

    /// Leave one line blank if the page has room for it.
    pub fn skip(self, geometry: &PageGeometry) -> PageCursor {
        if self.fits(geometry, 1) && !self.at_page_top() {
            PageCursor {
                page: self.page,
                line: self.line + 1,
            }
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    DocumentTitle,
    Caption,
    SectionTitle,
    ColumnHeader,
    Body,
}

impl LineStyle {
    pub fn font_size(self) -> f32 {
        match self {
            LineStyle::DocumentTitle => 16.0,
            LineStyle::SectionTitle => 12.0,
            LineStyle::Caption | LineStyle::ColumnHeader | LineStyle::Body => 9.0,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(
            self,
            LineStyle::DocumentTitle | LineStyle::SectionTitle | LineStyle::ColumnHeader
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x_mm: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub page: usize,
    pub y_mm: f32,
    pub style: LineStyle,
    pub texts: Vec<PlacedText>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub geometry: PageGeometry,
    pub pages: usize,
    pub lines: Vec<PlannedLine>,
}

impl DocumentPlan {
    pub fn lines_on_page(&self, page: usize) -> impl Iterator<Item = &PlannedLine> {
        self.lines.iter().filter(move |l| l.page == page)
    }
}

/// Column `x` offsets and per-column character budget for `columns` equal
/// columns across the text width.
pub fn column_layout(geometry: &PageGeometry, columns: usize) -> (Vec<f32>, usize) {
    let columns = columns.max(1);
    let width = geometry.text_width_mm() / columns as f32;
    let offsets = (0..columns)
        .map(|i| geometry.left_mm + i as f32 * width)
        .collect();
    let max_chars = ((width / BODY_CHAR_WIDTH_MM) as usize).saturating_sub(1);
    (offsets, max_chars)
}

fn fit_text(text: &str, max_chars: usize) -> String {
    truncate_chars(&printable_ascii_lossy(text), max_chars).into_owned()
}

struct Planner {
    geometry: PageGeometry,
    cursor: PageCursor,
    lines: Vec<PlannedLine>,
    sections: usize,
}

impl Planner {
    fn push(&mut self, style: LineStyle, texts: Vec<PlacedText>) {
        let (at, next) = self.cursor.emit_line(&self.geometry);
        self.lines.push(PlannedLine {
            page: at.page,
            y_mm: self.geometry.line_y_mm(at.line),
            style,
            texts,
        });
        self.cursor = next;
    }

    fn push_single(&mut self, style: LineStyle, text: &str) {
        let max_chars = column_layout(&self.geometry, 1).1;
        let texts = vec![PlacedText {
            x_mm: self.geometry.left_mm,
            text: fit_text(text, max_chars),
        }];
        self.push(style, texts);
    }

    fn push_columns<'a>(&mut self, style: LineStyle, cells: impl ExactSizeIterator<Item = &'a str>) {
        let (offsets, max_chars) = column_layout(&self.geometry, cells.len());
        let texts = offsets
            .into_iter()
            .zip(cells)
            .map(|(x_mm, text)| PlacedText {
                x_mm,
                text: fit_text(text, max_chars),
            })
            .collect();
        self.push(style, texts);
    }
}

impl SectionSink for Planner {
    type Error = std::convert::Infallible;

    fn section<R, const N: usize>(
        &mut self,
        info: &SectionInfo,
        rows: &[R],
    ) -> Result<(), Self::Error>
    where
        R: ReportRow<N>,
    {
        if self.sections > 0 {
            self.cursor = self.cursor.skip(&self.geometry);
        }
        self.sections += 1;

        // Title, column header and the first body line stay together.
        self.cursor = self.cursor.reserve(&self.geometry, 3);
        self.push_single(LineStyle::SectionTitle, info.title);
        self.push_columns(LineStyle::ColumnHeader, R::COLUMNS.iter().copied());

        if rows.is_empty() {
            self.push_single(LineStyle::Body, EMPTY_SECTION);
        }
        for row in rows {
            let cells = row.cells().map(|c| c.display());
            self.push_columns(LineStyle::Body, cells.iter().map(String::as_str));
        }
        Ok(())
    }
}

/// Lay out the whole bundle: title block, then every section in order.
pub fn plan(bundle: &ReportBundle, geometry: PageGeometry) -> DocumentPlan {
    let mut planner = Planner {
        geometry,
        cursor: PageCursor::default(),
        lines: Vec::new(),
        sections: 0,
    };

    planner.push_single(LineStyle::DocumentTitle, DOCUMENT_TITLE);
    let caption = format!(
        "Generated at {}",
        bundle.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    planner.push_single(LineStyle::Caption, &caption);
    planner.cursor = planner.cursor.skip(&geometry);

    if let Err(never) = bundle.write_sections(&mut planner) {
        match never {}
    }

    let pages = planner.lines.last().map_or(1, |l| l.page + 1);
    DocumentPlan {
        geometry,
        pages,
        lines: planner.lines,
    }
}
