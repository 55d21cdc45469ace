//! PDF 1.4 floor plan report.
//!
//! Hand-assembled, uncompressed PDF using the standard Helvetica fonts in
//! WinAnsiEncoding. Output is deterministic: no timestamps or ids.
//!
//! Object layout:
//! - 1: catalog, 2: page tree, 3: Helvetica, 4: Helvetica-Bold, 5: info
//! - 6 + 2i: content stream of page i, 7 + 2i: page i

use std::fmt::{self, Write};

use log::debug;

use super::layout::{PlanPage, Viewport, page_bounds, plan_pages};
use super::{Encoded, Encoder, ExportError, format_area, format_length, room_name};
use crate::config::ExportSection;
use crate::core::Point2D;
use crate::property::{AreaDisplay, OpeningKind, PropertyDocument, Room, RoomKind, WallStyle};

/// Largest drawing scale (points per meter)
const MAX_SCALE: f32 = 150.0;

const HEADER_HEIGHT: f32 = 40.0;
const FOOTER_HEIGHT: f32 = 24.0;
const FIRST_PAGE_OBJECT: usize = 6;

/// Which labels are drawn on each plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Labels {
    /// Room names and subtitles
    Names,
    /// Names plus room areas
    Areas,
    /// Names plus every wall length
    WallLengths,
}

pub(crate) struct PdfEncoder {
    labels: Labels,
}

impl PdfEncoder {
    pub(crate) const fn new(labels: Labels) -> Self {
        Self { labels }
    }
}

impl Encoder for PdfEncoder {
    fn encode(
        &self,
        document: &PropertyDocument,
        options: &ExportSection,
    ) -> Result<Encoded, ExportError> {
        let mut warnings = super::unscanned_warnings(document);
        if let Some(overlap) = document.find_overlapping_rooms() {
            warnings.push(format!(
                "rooms '{}' and '{}' on {} overlap",
                room_name(document, overlap.first),
                room_name(document, overlap.second),
                overlap.floor
            ));
        }

        let pages = plan_pages(document);
        let mut contents = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let plan_number = pages[..index]
                .iter()
                .filter(|p| p.floor == page.floor)
                .count();
            let mut content = String::new();
            self.draw_page(&mut content, document, page, plan_number, options)
                .map_err(|e| ExportError::Encoding(e.to_string()))?;
            contents.push(content);
        }
        debug!("PDF plan: {} pages", contents.len());

        let bytes = assemble(&contents, options, &options.report_title)
            .map_err(|e| ExportError::Encoding(e.to_string()))?;
        Ok(Encoded { bytes, warnings })
    }
}

impl PdfEncoder {
    fn draw_page(
        &self,
        out: &mut String,
        document: &PropertyDocument,
        page: &PlanPage<'_>,
        plan_number: usize,
        options: &ExportSection,
    ) -> fmt::Result {
        let (width, height) = options.page.dimensions();
        let margin = options.margin;

        let mut title = format!("{}: {}", options.report_title, page.floor);
        if plan_number > 0 {
            write!(title, " (plan {})", plan_number + 1)?;
        }
        text(out, "F2", 14.0, margin, height - margin - 14.0, &title)?;
        let address = document.details().address_line();
        if !address.is_empty() {
            text(out, "F1", 9.0, margin, height - margin - 28.0, &address)?;
        }

        let total = document.floor_area(page.floor);
        text(
            out,
            "F1",
            9.0,
            margin,
            margin,
            &format!("Floor area: {}", format_area(total)),
        )?;

        let Some(bounds) = page_bounds(&page.rooms) else {
            return Ok(());
        };
        let view = Viewport::fit(
            bounds,
            margin,
            margin + FOOTER_HEIGHT,
            width - 2.0 * margin,
            height - 2.0 * margin - FOOTER_HEIGHT - HEADER_HEIGHT,
            MAX_SCALE,
        );

        for room in &page.rooms {
            self.draw_outline(out, room, &view)?;
        }
        for room in &page.rooms {
            self.draw_openings(out, room, &view)?;
        }
        for room in &page.rooms {
            self.draw_labels(out, room, &view)?;
        }
        Ok(())
    }

    fn draw_outline(&self, out: &mut String, room: &Room, view: &Viewport) -> fmt::Result {
        let Some(boundary) = room.boundary() else {
            return Ok(());
        };
        let settings = room.settings();
        let (r, g, b) = settings.colour.over_white();

        writeln!(out, "q")?;
        if room.kind() == RoomKind::Room {
            writeln!(out, "{:.3} {:.3} {:.3} rg", r, g, b)?;
        }
        match settings.wall_style {
            WallStyle::Normal => writeln!(out, "0 0 0 RG 2 w")?,
            WallStyle::Thin => writeln!(out, "0.25 0.25 0.25 RG 0.75 w")?,
            WallStyle::Broken => writeln!(out, "0.25 0.25 0.25 RG 0.75 w [4 3] 0 d")?,
        }
        for (i, v) in boundary.vertices().iter().enumerate() {
            let p = view.map(*v);
            let op = if i == 0 { "m" } else { "l" };
            writeln!(out, "{:.2} {:.2} {}", p.x, p.y, op)?;
        }
        // Plots and exteriors are outlines only
        let paint = if room.kind() == RoomKind::Room { "b" } else { "s" };
        writeln!(out, "{}", paint)?;
        writeln!(out, "Q")
    }

    fn draw_openings(&self, out: &mut String, room: &Room, view: &Viewport) -> fmt::Result {
        let Some(boundary) = room.boundary() else {
            return Ok(());
        };
        let gap_width = match room.settings().wall_style {
            WallStyle::Normal => 3.0,
            WallStyle::Thin | WallStyle::Broken => 1.75,
        };

        for opening in room.openings() {
            let Some((start, end)) = boundary.wall(opening.wall) else {
                continue;
            };
            let dir = (end - start).normalized();
            let near = start + dir * opening.offset;
            let far = near + dir * opening.width;
            let (p0, p1) = (view.map(near), view.map(far));

            writeln!(out, "q 1 1 1 RG {:.2} w", gap_width)?;
            line(out, p0, p1)?;
            writeln!(out, "Q")?;

            match opening.kind {
                OpeningKind::Window => {
                    writeln!(out, "q 0 0 0 RG 0.75 w")?;
                    line(out, p0, p1)?;
                    writeln!(out, "Q")?;
                }
                OpeningKind::Door => {
                    let inward = boundary
                        .outward_normal(opening.wall)
                        .map(|n| n * -1.0)
                        .unwrap_or(Point2D::ZERO);
                    let leaf = view.map(near + inward * opening.width);
                    writeln!(out, "q 0 0 0 RG 0.5 w")?;
                    line(out, p0, leaf)?;
                    writeln!(out, "Q")?;
                }
                OpeningKind::Passage => {}
            }
        }
        Ok(())
    }

    fn draw_labels(&self, out: &mut String, room: &Room, view: &Viewport) -> fmt::Result {
        let Some(boundary) = room.boundary() else {
            return Ok(());
        };
        let settings = room.settings();
        let centre = view.map(boundary.centroid());

        let mut lines = vec![room.name().to_string()];
        if room.kind() == RoomKind::Room {
            if let Some(subtitle) = &settings.custom_subtitle {
                lines.push(subtitle.clone());
            }
            if self.labels == Labels::Areas && settings.area_display == AreaDisplay::Show {
                lines.push(format_area(boundary.area()));
            }
        }

        let top = centre.y + (lines.len() as f32 - 1.0) * 5.0;
        for (i, label) in lines.iter().enumerate() {
            let (font, size) = if i == 0 { ("F2", 9.0) } else { ("F1", 8.0) };
            centred_text(out, font, size, centre.x, top - i as f32 * 10.0, label)?;
        }

        if self.labels == Labels::WallLengths {
            for i in 0..boundary.len() {
                let (Some((a, b)), Some(normal)) = (boundary.wall(i), boundary.outward_normal(i))
                else {
                    continue;
                };
                let mid = view.map(a.midpoint(&b));
                let at = mid + normal * 9.0;
                centred_text(out, "F1", 7.0, at.x, at.y - 2.5, &format_length(a.distance(&b)))?;
            }
        }
        Ok(())
    }
}

fn line(out: &mut String, a: Point2D, b: Point2D) -> fmt::Result {
    writeln!(out, "{:.2} {:.2} m {:.2} {:.2} l S", a.x, a.y, b.x, b.y)
}

fn text(out: &mut String, font: &str, size: f32, x: f32, y: f32, s: &str) -> fmt::Result {
    writeln!(
        out,
        "BT 0 g /{} {} Tf {:.2} {:.2} Td {} Tj ET",
        font,
        size,
        x,
        y,
        pdf_string(s)
    )
}

/// Text centred on `x`, using an average Helvetica advance of half the size.
fn centred_text(out: &mut String, font: &str, size: f32, x: f32, y: f32, s: &str) -> fmt::Result {
    let approx_width = s.chars().count() as f32 * size * 0.5;
    text(out, font, size, x - approx_width / 2.0, y, s)
}

/// PDF literal string in WinAnsiEncoding.
fn pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('(');
    for ch in s.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            '\u{2013}' | '\u{2014}' => out.push('-'),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

/// Wrap page content streams into a complete file.
fn assemble(
    contents: &[String],
    options: &ExportSection,
    title: &str,
) -> Result<Vec<u8>, fmt::Error> {
    let (width, height) = options.page.dimensions();
    let page_id = |i: usize| FIRST_PAGE_OBJECT + 2 * i + 1;

    let mut objects: Vec<String> = Vec::with_capacity(FIRST_PAGE_OBJECT - 1 + 2 * contents.len());
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

    let mut kids = String::new();
    for i in 0..contents.len() {
        if i > 0 {
            kids.push(' ');
        }
        write!(kids, "{} 0 R", page_id(i))?;
    }
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        contents.len()
    ));
    for font in ["Helvetica", "Helvetica-Bold"] {
        objects.push(format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            font
        ));
    }
    objects.push(format!(
        "<< /Producer (griha-scan) /Title {} >>",
        pdf_string(title)
    ));

    for (i, content) in contents.iter().enumerate() {
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            width,
            height,
            page_id(i) - 1
        ));
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    let mut xref = String::new();
    writeln!(xref, "xref\n0 {}", objects.len() + 1)?;
    writeln!(xref, "0000000000 65535 f ")?;
    for offset in offsets {
        writeln!(xref, "{:010} 00000 n ", offset)?;
    }
    write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    )?;
    out.extend_from_slice(xref.as_bytes());
    Ok(out)
}
