//! GDAL metadata and no-data tags
//!
//! GDAL keeps free-form metadata in an XML document stored in tag 42112:
//!
//! ```xml
//! <GDALMetadata>
//!   <Item name="Description" sample="0">Snow Cover</Item>
//! </GDALMetadata>
//! ```
//!
//! Items with a `sample` attribute belong to that band, the others to the
//! dataset. The no-data value lives separately in tag 42113 as ASCII.

use std::collections::BTreeMap;
use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::tiff::errors::{TiffError, TiffResult};

/// Metadata items from a GDAL_METADATA document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GdalMetadata {
    pub dataset: BTreeMap<String, String>,
    pub bands: BTreeMap<usize, BTreeMap<String, String>>,
}

impl GdalMetadata {
    /// Items of one band, empty when the band has none
    pub fn band(&self, index: usize) -> BTreeMap<String, String> {
        self.bands.get(&index).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty() && self.bands.values().all(|items| items.is_empty())
    }
}

fn xml_error(error: impl std::fmt::Display) -> TiffError {
    TiffError::GenericError(format!("GDAL metadata XML: {}", error))
}

/// Serialises metadata to the GDAL XML form
pub fn to_xml(metadata: &GdalMetadata) -> TiffResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Start(BytesStart::new("GDALMetadata"))).map_err(xml_error)?;

    let dataset_items = metadata.dataset.iter().map(|(name, value)| (None, name, value));
    let band_items = metadata.bands.iter()
        .flat_map(|(band, items)| items.iter().map(move |(name, value)| (Some(*band), name, value)));

    for (band, name, value) in dataset_items.chain(band_items) {
        let mut item = BytesStart::new("Item");
        item.push_attribute(("name", name.as_str()));
        let sample = band.map(|index| index.to_string());
        if let Some(sample) = &sample {
            item.push_attribute(("sample", sample.as_str()));
        }

        writer.write_event(Event::Start(item)).map_err(xml_error)?;
        writer.write_event(Event::Text(BytesText::new(value))).map_err(xml_error)?;
        writer.write_event(Event::End(BytesEnd::new("Item"))).map_err(xml_error)?;
    }

    writer.write_event(Event::End(BytesEnd::new("GDALMetadata"))).map_err(xml_error)?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

/// Parses a GDAL XML metadata document
pub fn parse_xml(xml: &str) -> TiffResult<GdalMetadata> {
    let mut reader = Reader::from_str(xml);
    let mut metadata = GdalMetadata::default();

    // (name, sample) of the Item being read
    let mut current: Option<(String, Option<usize>)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(element) if element.name().as_ref() == b"Item" => {
                let mut name = None;
                let mut sample = None;
                for attribute in element.attributes() {
                    let attribute = attribute.map_err(xml_error)?;
                    let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
                    match attribute.key.as_ref() {
                        b"name" => name = Some(value),
                        b"sample" => sample = value.trim().parse::<usize>().ok(),
                        _ => {}
                    }
                }
                current = name.map(|name| (name, sample));
                text.clear();
            },
            Event::Text(content) if current.is_some() => {
                text.push_str(&content.unescape().map_err(xml_error)?);
            },
            Event::End(element) if element.name().as_ref() == b"Item" => {
                if let Some((name, sample)) = current.take() {
                    let value = text.trim().to_string();
                    match sample {
                        Some(band) => {
                            metadata.bands.entry(band).or_default().insert(name, value);
                        },
                        None => {
                            metadata.dataset.insert(name, value);
                        },
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(metadata)
}

/// Formats a no-data value the way GDAL writes it
pub fn format_nodata(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Parses the GDAL_NODATA string
pub fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim().trim_end_matches('\0');
    match trimmed.to_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}
