//! Builds small PPTX packages for tests.

use crate::package::Package;
use deckgen_core::Position;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";

/// Geometry of the master title placeholder.
pub const MASTER_TITLE_POSITION: Position = Position {
    left: 0.5,
    top: 0.3,
    width: 9.0,
    height: 1.25,
};

/// Geometry of the master body placeholder.
pub const MASTER_BODY_POSITION: Position = Position {
    left: 0.5,
    top: 1.75,
    width: 9.0,
    height: 4.95,
};

struct FixtureSlide {
    layout: usize,
    xml: String,
    notes: bool,
}

/// A template under construction.
pub struct Fixture {
    size: Option<(i64, i64)>,
    layouts: Vec<(String, Vec<String>)>,
    slides: Vec<FixtureSlide>,
    reversed_lists: bool,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            size: None,
            layouts: Vec::new(),
            slides: Vec::new(),
            reversed_lists: false,
        }
    }

    /// Write `sldLayoutIdLst` and `sldIdLst` in the reverse of part and
    /// relationship numbering.
    pub fn reversed_lists(mut self) -> Self {
        self.reversed_lists = true;
        self
    }

    fn list_order(&self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        if self.reversed_lists {
            order.reverse();
        }
        order
    }

    pub fn size(mut self, cx: i64, cy: i64) -> Self {
        self.size = Some((cx, cy));
        self
    }

    pub fn layout(mut self, name: &str, shapes: &[String]) -> Self {
        self.layouts.push((name.to_string(), shapes.to_vec()));
        self
    }

    pub fn slide(self, layout: usize, shapes: &[String]) -> Self {
        self.slide_xml_raw(layout, slide_xml(shapes))
    }

    pub fn slide_xml_raw(mut self, layout: usize, xml: String) -> Self {
        self.slides.push(FixtureSlide {
            layout,
            xml,
            notes: false,
        });
        self
    }

    /// Attach a notes slide to the most recently added slide.
    pub fn with_notes(mut self) -> Self {
        if let Some(slide) = self.slides.last_mut() {
            slide.notes = true;
        }
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        for (name, content) in self.parts() {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn package(&self) -> Package {
        Package::from_reader(Cursor::new(self.bytes())).unwrap()
    }

    pub fn write(&self, path: &Path) {
        std::fs::write(path, self.bytes()).unwrap();
    }

    fn parts(&self) -> Vec<(String, String)> {
        let mut parts = Vec::new();
        let mut overrides = vec![
            ("ppt/presentation.xml".to_string(), format!("{}.presentation.main+xml", CT_PML)),
            ("ppt/slideMasters/slideMaster1.xml".to_string(), format!("{}.slideMaster+xml", CT_PML)),
            (
                "ppt/theme/theme1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.theme+xml".to_string(),
            ),
        ];

        parts.push((
            "_rels/.rels".to_string(),
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml".to_string())]),
        ));

        // presentation
        let mut pres_rels = vec![
            ("rId1", "slideMaster", "slideMasters/slideMaster1.xml".to_string()),
            ("rId2", "theme", "theme/theme1.xml".to_string()),
        ];
        let slide_rids: Vec<String> = (0..self.slides.len()).map(|i| format!("rId{}", i + 3)).collect();
        let mut sld_ids = String::new();
        for (n, i) in self.list_order(slide_rids.len()).into_iter().enumerate() {
            sld_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + n, slide_rids[i]));
        }
        let size = self
            .size
            .map(|(cx, cy)| format!(r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy))
            .unwrap_or_default();
        let sld_id_lst = if sld_ids.is_empty() {
            String::new()
        } else {
            format!("<p:sldIdLst>{}</p:sldIdLst>", sld_ids)
        };
        parts.push((
            "ppt/presentation.xml".to_string(),
            format!(
                r#"{}<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}{}<p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
                DECL, NS, sld_id_lst, size
            ),
        ));

        // master
        let mut master_rels = Vec::new();
        let mut layout_ids = String::new();
        for i in 0..self.layouts.len() {
            master_rels.push((
                format!("rId{}", i + 1),
                "slideLayout",
                format!("../slideLayouts/slideLayout{}.xml", i + 1),
            ));
        }
        for (n, i) in self.list_order(self.layouts.len()).into_iter().enumerate() {
            layout_ids.push_str(&format!(
                r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                2147483649u64 + n as u64,
                i + 1
            ));
        }
        let theme_rid = format!("rId{}", self.layouts.len() + 1);
        master_rels.push((theme_rid, "theme", "../theme/theme1.xml".to_string()));
        parts.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&master_rels),
        ));
        let master_shapes = [
            placeholder_sp(2, "Title Placeholder 1", Some("title"), None, Some(emu(&MASTER_TITLE_POSITION))),
            placeholder_sp(3, "Text Placeholder 2", Some("body"), Some(1), Some(emu(&MASTER_BODY_POSITION))),
        ];
        parts.push((
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            format!(
                r#"{}<p:sldMaster {}><p:cSld>{}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst>{}</p:sldLayoutIdLst></p:sldMaster>"#,
                DECL,
                NS,
                sp_tree(&master_shapes),
                layout_ids
            ),
        ));

        // layouts
        for (i, (name, shapes)) in self.layouts.iter().enumerate() {
            let part = format!("ppt/slideLayouts/slideLayout{}.xml", i + 1);
            parts.push((
                part.clone(),
                format!(
                    r#"{}<p:sldLayout {}><p:cSld name="{}">{}</p:cSld></p:sldLayout>"#,
                    DECL,
                    NS,
                    name,
                    sp_tree(shapes)
                ),
            ));
            parts.push((
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", i + 1),
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml".to_string())]),
            ));
            overrides.push((part, format!("{}.slideLayout+xml", CT_PML)));
        }

        // slides
        for (i, slide) in self.slides.iter().enumerate() {
            let part = format!("ppt/slides/slide{}.xml", i + 1);
            let mut slide_rels = vec![(
                "rId1",
                "slideLayout",
                format!("../slideLayouts/slideLayout{}.xml", slide.layout + 1),
            )];
            if slide.notes {
                let notes = format!("ppt/notesSlides/notesSlide{}.xml", i + 1);
                slide_rels.push(("rId2", "notesSlide", format!("../notesSlides/notesSlide{}.xml", i + 1)));
                parts.push((
                    notes.clone(),
                    format!(
                        r#"{}<p:notes {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:notes>"#,
                        DECL, NS
                    ),
                ));
                parts.push((
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", i + 1),
                    rels(&[("rId1", "slide", format!("../slides/slide{}.xml", i + 1))]),
                ));
                overrides.push((notes, format!("{}.notesSlide+xml", CT_PML)));
            }
            parts.push((part.clone(), slide.xml.clone()));
            parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", i + 1), rels(&slide_rels)));
            overrides.push((part, format!("{}.slide+xml", CT_PML)));

            pres_rels.push((
                slide_rids[i].as_str(),
                "slide",
                format!("slides/slide{}.xml", i + 1),
            ));
        }

        parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels(&pres_rels)));
        parts.push((
            "ppt/theme/theme1.xml".to_string(),
            format!(
                r#"{}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements/></a:theme>"#,
                DECL
            ),
        ));

        let mut types = format!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
            DECL
        );
        for (part, ct) in overrides {
            types.push_str(&format!(r#"<Override PartName="/{}" ContentType="{}"/>"#, part, ct));
        }
        types.push_str("</Types>");
        parts.insert(0, ("[Content_Types].xml".to_string(), types));

        parts
    }
}

/// Layouts, slides and a notes part resembling a stock widescreen deck.
pub fn standard_template() -> Fixture {
    let chrome = || {
        vec![
            placeholder_sp(20, "Date Placeholder 3", Some("dt"), Some(10), None),
            placeholder_sp(21, "Footer Placeholder 4", Some("ftr"), Some(11), None),
            placeholder_sp(22, "Slide Number Placeholder 5", Some("sldNum"), Some(12), None),
        ]
    };
    let with_chrome = |mut shapes: Vec<String>| {
        shapes.extend(chrome());
        shapes
    };

    Fixture::new()
        .size(12_192_000, 6_858_000)
        .layout(
            "Title Slide",
            &with_chrome(vec![
                placeholder_sp(2, "Title 1", Some("ctrTitle"), None, Some((685_800, 2_130_425, 7_772_400, 1_470_025))),
                placeholder_sp(3, "Subtitle 2", Some("subTitle"), Some(1), Some((1_371_600, 3_886_200, 6_400_800, 1_752_600))),
            ]),
        )
        .layout(
            "Title and Content",
            &with_chrome(vec![
                placeholder_sp(2, "Title 1", Some("title"), None, None),
                placeholder_sp(3, "Content Placeholder 2", None, Some(1), None),
            ]),
        )
        .layout(
            "Section Header",
            &with_chrome(vec![
                placeholder_sp(2, "Title 1", Some("title"), None, Some((722_313, 4_406_900, 7_772_400, 1_362_075))),
                placeholder_sp(3, "Text Placeholder 2", Some("body"), Some(1), Some((722_313, 2_906_713, 7_772_400, 1_500_187))),
            ]),
        )
        .layout(
            "Two Content",
            &with_chrome(vec![
                placeholder_sp(2, "Title 1", Some("title"), None, None),
                placeholder_sp(3, "Content Placeholder 2", None, Some(1), Some((457_200, 1_600_200, 4_038_600, 4_525_963))),
                placeholder_sp(4, "Content Placeholder 3", None, Some(2), Some((4_648_200, 1_600_200, 4_038_600, 4_525_963))),
            ]),
        )
        .layout("Title Only", &with_chrome(vec![placeholder_sp(2, "Title 1", Some("title"), None, None)]))
        .layout("Blank", &chrome())
        .layout(
            "Picture with Caption",
            &with_chrome(vec![
                placeholder_sp(2, "Title 1", Some("title"), None, Some((1_792_288, 4_800_600, 5_486_400, 566_738))),
                placeholder_sp(3, "Picture Placeholder 2", Some("pic"), Some(1), Some((1_792_288, 612_775, 5_486_400, 4_114_800))),
                placeholder_sp(4, "Text Placeholder 3", Some("body"), Some(2), Some((1_792_288, 5_367_338, 5_486_400, 804_862))),
            ]),
        )
        .slide(
            0,
            &[
                placeholder_text(2, "Title 1", Some("ctrTitle"), None, "Quarterly Presentation", Some(4400)),
                placeholder_text(3, "Subtitle 2", Some("subTitle"), Some(1), "FY2024", None),
            ],
        )
        .with_notes()
        .slide(
            1,
            &[
                placeholder_text(2, "Title 1", Some("title"), None, "Agenda", Some(2800)),
                placeholder_text(3, "Content Placeholder 2", None, Some(1), "Intro", None),
                picture(4, "Picture 3"),
            ],
        )
        .slide(5, &[text_sp(2, "TextBox 1", "02", Some(2400)), text_sp(3, "TextBox 2", "Growth", None)])
}

fn emu(position: &Position) -> (i64, i64, i64, i64) {
    let to_emu = |inches: f64| (inches * 914_400.0).round() as i64;
    (
        to_emu(position.left),
        to_emu(position.top),
        to_emu(position.width),
        to_emu(position.height),
    )
}

fn rels<S: AsRef<str>>(entries: &[(S, &str, String)]) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, DECL, RELS_NS);
    for (id, ty, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id.as_ref(),
            REL,
            ty,
            target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn sp_tree(shapes: &[String]) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree>"#,
        shapes.concat()
    )
}

fn xfrm(geometry: Option<(i64, i64, i64, i64)>) -> String {
    match geometry {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    }
}

fn ph(ph_type: Option<&str>, idx: Option<u32>) -> String {
    let mut ph = String::from("<p:ph");
    if let Some(t) = ph_type {
        ph.push_str(&format!(r#" type="{}""#, t));
    }
    if let Some(i) = idx {
        ph.push_str(&format!(r#" idx="{}""#, i));
    }
    ph.push_str("/>");
    ph
}

fn paragraph(text: &str, size: Option<i64>) -> String {
    let sz = size.map(|s| format!(r#" sz="{}""#, s)).unwrap_or_default();
    format!(r#"<a:p><a:r><a:rPr lang="en-US"{}/><a:t>{}</a:t></a:r></a:p>"#, sz, text)
}

/// A complete slide part around `shapes`.
pub fn slide_xml(shapes: &[String]) -> String {
    format!(r#"{}<p:sld {}><p:cSld>{}</p:cSld></p:sld>"#, DECL, NS, sp_tree(shapes))
}

/// A text box at (1in, 1in), 4in x 1in.
pub fn text_sp(id: u32, name: &str, text: &str, size: Option<i64>) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>{}<p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id,
        name,
        xfrm(Some((914_400, 914_400, 3_657_600, 914_400))),
        paragraph(text, size)
    )
}

/// A placeholder with an empty text body.
pub fn placeholder_sp(
    id: u32,
    name: &str,
    ph_type: Option<&str>,
    idx: Option<u32>,
    geometry: Option<(i64, i64, i64, i64)>,
) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr>{}<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#,
        id,
        name,
        ph(ph_type, idx),
        xfrm(geometry)
    )
}

/// A placeholder without geometry holding one paragraph.
pub fn placeholder_text(
    id: u32,
    name: &str,
    ph_type: Option<&str>,
    idx: Option<u32>,
    text: &str,
    size: Option<i64>,
) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id,
        name,
        ph(ph_type, idx),
        paragraph(text, size)
    )
}

pub fn picture(id: u32, name: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill>{}</p:pic>"#,
        id,
        name,
        xfrm(Some((5_486_400, 1_828_800, 2_743_200, 2_743_200)))
    )
}
