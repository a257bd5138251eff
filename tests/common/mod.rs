#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

pub const PRICE_SHEET: &str = "2. Precio Interno Mensual";

#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

pub fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                Cell::Text(s) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference,
                    escape(s)
                )),
                Cell::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n))
                }
                Cell::Empty => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Smallest xlsx package the reader accepts: workbook, its relationships and inline-string sheets.
pub fn xlsx(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );

    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            n,
            n
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");
    content_types.push_str("</Types>");

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut add = |name: &str, body: &str| {
        zip.start_file::<_, ()>(name, FileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", &content_types);
    add("_rels/.rels", root_rels);
    add("xl/workbook.xml", &workbook);
    add("xl/_rels/workbook.xml.rels", &rels);
    for (i, (_, rows)) in sheets.iter().enumerate() {
        add(&format!("xl/worksheets/sheet{}.xml", i + 1), &sheet_xml(rows));
    }

    zip.finish().unwrap().into_inner()
}

/// The published layout: 5 metadata rows, a header row, then dates in D and prices in E.
pub fn price_sheet_rows(data: &[(Cell, Cell)]) -> Vec<Vec<Cell>> {
    let mut rows = vec![
        vec![text("Federación Nacional de Cafeteros de Colombia")],
        vec![text("Precio interno de referencia")],
        vec![],
        vec![text("Pesos por carga de 125 kg de café pergamino seco")],
        vec![],
        vec![Cell::Empty, Cell::Empty, Cell::Empty, text("Mes"), text("Precio interno")],
    ];
    for (date, price) in data {
        rows.push(vec![
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            date.clone(),
            price.clone(),
        ]);
    }
    rows
}

pub fn price_workbook(data: &[(Cell, Cell)]) -> Vec<u8> {
    xlsx(&[
        ("1. Precio Interno Diario", vec![vec![text("diario")]]),
        (PRICE_SHEET, price_sheet_rows(data)),
    ])
}

/// Rows from the documented example: two January rows, one without a date, one with a bad price.
pub fn mixed_rows() -> Vec<(Cell, Cell)> {
    vec![
        (text("2024-01-15"), text("850000")),
        (text("2024-01-20"), text("860000")),
        (Cell::Empty, text("870000")),
        (text("2024-02-01"), text("bad")),
    ]
}

pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(files_under(&path));
            } else {
                files.push(path);
            }
        }
    }
    files
}
