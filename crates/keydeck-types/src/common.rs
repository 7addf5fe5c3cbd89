//! Value types shared by inbound events and outbound commands.

use serde::{Deserialize, Serialize};

use crate::ids::DeviceName;

/// Column and row of a key on the device grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub column: u32,
    pub row: u32,
}

/// Hardware description sent with `deviceDidConnect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "type", default)]
    pub device_type: DeviceType,
    #[serde(default)]
    pub size: DeviceSize,
    #[serde(default)]
    pub name: DeviceName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSize {
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub rows: u32,
}

/// Kind of control surface. Unrecognised values from newer hosts are kept
/// as [`DeviceType::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum DeviceType {
    #[default]
    StreamDeck,
    StreamDeckMini,
    StreamDeckXl,
    StreamDeckMobile,
    CorsairGKeys,
    Other(u8),
}

impl From<u8> for DeviceType {
    fn from(value: u8) -> Self {
        match value {
            0 => DeviceType::StreamDeck,
            1 => DeviceType::StreamDeckMini,
            2 => DeviceType::StreamDeckXl,
            3 => DeviceType::StreamDeckMobile,
            4 => DeviceType::CorsairGKeys,
            other => DeviceType::Other(other),
        }
    }
}

impl From<DeviceType> for u8 {
    fn from(value: DeviceType) -> Self {
        match value {
            DeviceType::StreamDeck => 0,
            DeviceType::StreamDeckMini => 1,
            DeviceType::StreamDeckXl => 2,
            DeviceType::StreamDeckMobile => 3,
            DeviceType::CorsairGKeys => 4,
            DeviceType::Other(other) => other,
        }
    }
}

/// Where a title or image change applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Target {
    #[default]
    HardwareAndSoftware,
    HardwareOnly,
    SoftwareOnly,
}

impl TryFrom<u8> for Target {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Target::HardwareAndSoftware),
            1 => Ok(Target::HardwareOnly),
            2 => Ok(Target::SoftwareOnly),
            other => Err(format!("invalid target: {other}")),
        }
    }
}

impl From<Target> for u8 {
    fn from(value: Target) -> Self {
        match value {
            Target::HardwareAndSoftware => 0,
            Target::HardwareOnly => 1,
            Target::SoftwareOnly => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Font and placement of a key title, as configured by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: VerticalAlignment,
    pub title_color: String,
}
