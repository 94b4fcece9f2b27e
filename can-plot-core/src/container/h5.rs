//! HDF5 log container
//!
//! Reads containers produced by the CAN logger using the `hdf5` crate.
//!
//! ## Layout
//! - Channels live below a group (`CAN_IDs` by default) or at the file root.
//! - A channel is either a dataset carrying its attributes directly, or a
//!   group carrying the attributes with the sample dataset inside.
//! - Sample datasets are compound tables; only the `ts` and `value` fields
//!   are read. HDF5 converts the stored numeric types to `f64`.
//! - Attributes: `hex_id`, `unit`, `scale`, `description`. Text attributes may
//!   hold the `"None"` sentinel.
//! - Annotations live in a compound table (`COMMENTS`) with fields `id`, `ts`
//!   and `content`.

use super::LogContainer;
use crate::config::ContainerLayout;
use crate::types::{AnnotationRow, ChannelAttributes, PlotError, RawScale, Result, Sample};
use hdf5::types::{TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, Group, H5Type, Location};
use std::path::Path;

const ATTR_CODE: &str = "hex_id";
const ATTR_UNIT: &str = "unit";
const ATTR_SCALE: &str = "scale";
const ATTR_DESCRIPTION: &str = "description";

#[derive(H5Type, Debug, Clone, Copy)]
#[repr(C)]
struct StoredSample {
    ts: f64,
    value: f64,
}

#[derive(H5Type, Debug, Clone)]
#[repr(C)]
struct StoredComment {
    id: u32,
    ts: f64,
    content: VarLenUnicode,
}

/// Attribute value as found in the file
enum AttrValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// A channel entry: a bare dataset, or a group wrapping one
enum ChannelEntry {
    Dataset(Dataset),
    Group(Group, Dataset),
}

impl ChannelEntry {
    fn attributes(&self) -> &Location {
        match self {
            ChannelEntry::Dataset(dataset) => {
                let location: &Location = dataset;
                location
            }
            ChannelEntry::Group(group, _) => {
                let location: &Location = group;
                location
            }
        }
    }

    fn dataset(&self) -> &Dataset {
        match self {
            ChannelEntry::Dataset(dataset) | ChannelEntry::Group(_, dataset) => dataset,
        }
    }
}

/// Read-only HDF5 log container
///
/// The file is closed when the container is dropped.
pub struct Hdf5Container {
    file: File,
    layout: ContainerLayout,
}

impl Hdf5Container {
    /// Open an HDF5 file read-only
    pub fn open(path: &Path, layout: ContainerLayout) -> Result<Self> {
        log::info!("Opening HDF5 log: {:?}", path);

        if !path.exists() {
            return Err(PlotError::InvalidLogFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        log::debug!("HDF5 log opened, layout: {:?}", layout);

        Ok(Self { file, layout })
    }

    fn channel_parent(&self) -> Result<Group> {
        let name = self.layout.channel_group().unwrap_or("/");
        if name != "/" && !self.has_member(&self.file, name)? {
            return Err(PlotError::MissingEntry {
                what: "channel group",
                location: name.to_string(),
            });
        }
        Ok(self.file.group(name)?)
    }

    fn has_member(&self, group: &Group, name: &str) -> Result<bool> {
        Ok(group.member_names()?.iter().any(|member| member == name))
    }

    fn channel_entry(&self, key: &str) -> Result<ChannelEntry> {
        let parent = self.channel_parent()?;
        if !self.has_member(&parent, key)? {
            return Err(PlotError::ChannelNotFound(key.to_string()));
        }

        if let Ok(dataset) = parent.dataset(key) {
            return Ok(ChannelEntry::Dataset(dataset));
        }

        let group = parent.group(key)?;
        for member in group.member_names()? {
            if let Ok(dataset) = group.dataset(&member) {
                log::trace!("Channel {} uses dataset {}", key, member);
                return Ok(ChannelEntry::Group(group, dataset));
            }
        }

        Err(PlotError::MissingEntry {
            what: "sample dataset",
            location: key.to_string(),
        })
    }
}

impl LogContainer for Hdf5Container {
    fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    fn channel_keys(&self) -> Result<Vec<String>> {
        let parent = self.channel_parent()?;
        let mut keys = parent.member_names()?;

        // At the root the annotation table sits next to the channels
        if self.layout.channel_group().is_none() {
            keys.retain(|key| *key != self.layout.annotation_table);
        }

        log::debug!("Found {} channels", keys.len());
        Ok(keys)
    }

    fn read_attributes(&self, key: &str) -> Result<ChannelAttributes> {
        let entry = self.channel_entry(key)?;
        let location = entry.attributes();

        let code = match read_attr(location, ATTR_CODE)? {
            Some(AttrValue::Integer(code)) => u32::try_from(code).ok(),
            Some(AttrValue::Float(code)) if code >= 0.0 && code.fract() == 0.0 => {
                u32::try_from(code as u64).ok()
            }
            Some(AttrValue::Text(text)) => crate::resolver::parse_numeric_code(&text),
            _ => None,
        };

        let scale = match read_attr(location, ATTR_SCALE)? {
            Some(AttrValue::Float(scale)) => Some(RawScale::Number(scale)),
            Some(AttrValue::Integer(scale)) => Some(RawScale::Number(scale as f64)),
            Some(AttrValue::Text(text)) => Some(RawScale::Text(text)),
            None => None,
        };

        Ok(ChannelAttributes {
            code,
            unit: read_text_attr(location, ATTR_UNIT)?,
            scale,
            description: read_text_attr(location, ATTR_DESCRIPTION)?,
        })
    }

    fn read_samples(&self, key: &str) -> Result<Vec<Sample>> {
        let entry = self.channel_entry(key)?;
        let stored = entry.dataset().read_raw::<StoredSample>()?;
        log::debug!("Read {} samples for {}", stored.len(), key);

        Ok(stored
            .into_iter()
            .map(|s| Sample::new(s.ts, s.value))
            .collect())
    }

    fn annotation_rows(&self) -> Result<Vec<AnnotationRow>> {
        let table = &self.layout.annotation_table;
        if !self.has_member(&self.file, table)? {
            log::debug!("No annotation table {:?} in log", table);
            return Ok(Vec::new());
        }

        let rows = self.file.dataset(table)?.read_raw::<StoredComment>()?;
        Ok(rows
            .into_iter()
            .map(|row| AnnotationRow {
                index: row.id,
                position: row.ts,
                label: row.content.as_str().as_bytes().to_vec(),
            })
            .collect())
    }
}

fn read_attr(location: &Location, name: &str) -> Result<Option<AttrValue>> {
    if !location.attr_names()?.iter().any(|attr| attr == name) {
        return Ok(None);
    }

    let attr = location.attr(name)?;
    let value = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::VarLenUnicode => {
            AttrValue::Text(attr.read_scalar::<VarLenUnicode>()?.as_str().to_string())
        }
        TypeDescriptor::VarLenAscii => {
            AttrValue::Text(attr.read_scalar::<VarLenAscii>()?.as_str().to_string())
        }
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            AttrValue::Integer(attr.read_scalar::<i64>()?)
        }
        TypeDescriptor::Float(_) => AttrValue::Float(attr.read_scalar::<f64>()?),
        other => {
            log::debug!("Ignoring attribute {} of unsupported type {:?}", name, other);
            return Ok(None);
        }
    };

    Ok(Some(value))
}

fn read_text_attr(location: &Location, name: &str) -> Result<Option<String>> {
    Ok(match read_attr(location, name)? {
        Some(AttrValue::Text(text)) => Some(text),
        Some(AttrValue::Integer(value)) => Some(value.to_string()),
        Some(AttrValue::Float(value)) => Some(value.to_string()),
        None => None,
    })
}
