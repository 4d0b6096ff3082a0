//! `manifest.xml` generation for packaged issues.
//!
//! The folio viewer reads a fixed-schema descriptor. Every field except the
//! page count is a layout constant, and the viewer compares the document
//! byte-for-byte, so it is rendered from a template rather than through an
//! XML serializer.

/// File name of the manifest inside a package.
pub const MANIFEST_FILENAME: &str = "manifest.xml";

pub const PAGE_WIDTH: u32 = 2032;
pub const PAGE_HEIGHT: u32 = 2729;
pub const LINK_COLOUR: &str = "0x0000FF";
pub const LINK_BORDER_COLOUR: &str = "0x0000FF";

/// Render the manifest for an issue with `page_count` pages.
pub fn render_manifest(page_count: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<folio>
  <pageWidth>{PAGE_WIDTH}</pageWidth>
  <pageHeight>{PAGE_HEIGHT}</pageHeight>
  <pages>{page_count}</pages>
  <tocMode>1</tocMode>
  <centreCoversInLandscape>True</centreCoversInLandscape>
  <portraitPageAlignmentMode>1</portraitPageAlignmentMode>
  <coverPageNumber>0</coverPageNumber>
  <linkColour>{LINK_COLOUR}</linkColour>
  <linkBorderColour>{LINK_BORDER_COLOUR}</linkBorderColour>
  <linkBorderWidth>1</linkBorderWidth>
  <linkPadding>2</linkPadding>
  <enableSpreadMode>1</enableSpreadMode>
</folio>
"#
    )
}
