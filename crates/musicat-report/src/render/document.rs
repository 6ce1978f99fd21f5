//! PDF painter for a [`DocumentPlan`].

use printpdf::{BuiltinFont, Mm, PdfDocument, PdfLayerReference};

use crate::error::ReportError;
use crate::layout::{plan, DocumentPlan, PageGeometry, DOCUMENT_TITLE};
use crate::sections::ReportBundle;

const LAYER: &str = "Layer 1";

pub(super) fn render(bundle: &ReportBundle) -> Result<Vec<u8>, ReportError> {
    paint(&plan(bundle, PageGeometry::A4))
}

fn paint(plan: &DocumentPlan) -> Result<Vec<u8>, ReportError> {
    let g = plan.geometry;
    let (doc, first_page, first_layer) =
        PdfDocument::new(DOCUMENT_TITLE, Mm(g.width_mm), Mm(g.height_mm), LAYER);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Document(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Document(e.to_string()))?;

    let mut layers: Vec<PdfLayerReference> =
        vec![doc.get_page(first_page).get_layer(first_layer)];
    for _ in 1..plan.pages {
        let (page, layer) = doc.add_page(Mm(g.width_mm), Mm(g.height_mm), LAYER);
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for line in &plan.lines {
        let Some(layer) = layers.get(line.page) else {
            return Err(ReportError::Document(format!(
                "line planned on missing page {}",
                line.page
            )));
        };
        let font = if line.style.is_bold() { &bold } else { &regular };
        for text in &line.texts {
            layer.use_text(
                text.text.as_str(),
                line.style.font_size(),
                Mm(text.x_mm),
                Mm(line.y_mm),
                font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::Document(e.to_string()))
}
