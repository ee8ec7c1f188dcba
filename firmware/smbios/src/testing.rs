//! Byte-level fixture builders shared by the unit tests.

use alloc::vec;
use alloc::vec::Vec;

use crate::header::SpecVersion;
use crate::memory_device::offset;
use crate::{DMI_ANCHOR, SMBIOS2_ANCHOR, SMBIOS3_ANCHOR};

fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Encode one record: header, `fields` after the header, then the string set
pub fn record(record_type: u8, handle: u16, fields: &[u8], strings: &[&str]) -> Vec<u8> {
    let mut out = vec![record_type, (4 + fields.len()) as u8];
    out.extend_from_slice(&handle.to_le_bytes());
    out.extend_from_slice(fields);

    if strings.is_empty() {
        out.extend_from_slice(&[0, 0]);
    } else {
        for s in strings {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        out.push(0);
    }
    out
}

/// Encode an End-of-Table record
pub fn end_of_table(handle: u16) -> Vec<u8> {
    record(127, handle, &[], &[])
}

/// Encode a `_SM_` entry point with both checksums fixed up
pub fn entry_point32(version: SpecVersion, address: u32, length: u16, count: u16) -> Vec<u8> {
    let mut ep = vec![0u8; 31];
    ep[0..4].copy_from_slice(&SMBIOS2_ANCHOR);
    ep[5] = 0x1F;
    ep[6] = version.major;
    ep[7] = version.minor;
    ep[8..10].copy_from_slice(&0x28u16.to_le_bytes());
    ep[16..21].copy_from_slice(&DMI_ANCHOR);
    ep[22..24].copy_from_slice(&length.to_le_bytes());
    ep[24..28].copy_from_slice(&address.to_le_bytes());
    ep[28..30].copy_from_slice(&count.to_le_bytes());
    ep[30] = (version.major << 4) | (version.minor & 0x0F);

    ep[21] = 0u8.wrapping_sub(byte_sum(&ep[16..31]));
    ep[4] = 0u8.wrapping_sub(byte_sum(&ep));
    ep
}

/// Encode a `_SM3_` entry point with its checksum fixed up
pub fn entry_point64(version: SpecVersion, address: u64, max_size: u32) -> Vec<u8> {
    let mut ep = vec![0u8; 24];
    ep[0..5].copy_from_slice(&SMBIOS3_ANCHOR);
    ep[6] = 0x18;
    ep[7] = version.major;
    ep[8] = version.minor;
    ep[10] = 0x01;
    ep[12..16].copy_from_slice(&max_size.to_le_bytes());
    ep[16..24].copy_from_slice(&address.to_le_bytes());

    ep[5] = 0u8.wrapping_sub(byte_sum(&ep));
    ep
}

/// Raw Memory Device field values
#[derive(Debug, Clone)]
pub struct DeviceFields {
    pub array_handle: u16,
    pub error_handle: u16,
    pub total_width: u16,
    pub data_width: u16,
    pub size: u16,
    pub form_factor: u8,
    pub device_set: u8,
    pub device_locator: u8,
    pub bank_locator: u8,
    pub memory_type: u8,
    pub type_detail: u16,
    pub speed: u16,
    pub manufacturer: u8,
    pub serial_number: u8,
    pub asset_tag: u8,
    pub part_number: u8,
    pub attributes: u8,
    pub extended_size: u32,
    pub configured_clock_speed: u16,
    pub minimum_voltage: u16,
    pub maximum_voltage: u16,
    pub configured_voltage: u16,
}

impl Default for DeviceFields {
    fn default() -> Self {
        Self {
            array_handle: 0x1000,
            error_handle: 0xFFFE,
            total_width: 64,
            data_width: 64,
            size: 8192,
            form_factor: 0x09,
            device_set: 0,
            device_locator: 1,
            bank_locator: 2,
            memory_type: 0x1A,
            type_detail: 0x0080,
            speed: 2400,
            manufacturer: 0,
            serial_number: 0,
            asset_tag: 0,
            part_number: 0,
            attributes: 1,
            extended_size: 0,
            configured_clock_speed: 2400,
            minimum_voltage: 1200,
            maximum_voltage: 1200,
            configured_voltage: 1200,
        }
    }
}

/// Memory Device fields (header excluded) for a record of `declared_length`
///
/// Bytes past the 2.8 layout are zero-filled.
pub fn memory_device_fields(values: &DeviceFields, declared_length: usize) -> Vec<u8> {
    let mut body = vec![0u8; declared_length.max(0x28)];
    let mut put = |at: usize, bytes: &[u8]| body[at..at + bytes.len()].copy_from_slice(bytes);

    put(offset::ARRAY_HANDLE, &values.array_handle.to_le_bytes());
    put(offset::ERROR_HANDLE, &values.error_handle.to_le_bytes());
    put(offset::TOTAL_WIDTH, &values.total_width.to_le_bytes());
    put(offset::DATA_WIDTH, &values.data_width.to_le_bytes());
    put(offset::SIZE, &values.size.to_le_bytes());
    put(offset::FORM_FACTOR, &[values.form_factor]);
    put(offset::DEVICE_SET, &[values.device_set]);
    put(offset::DEVICE_LOCATOR, &[values.device_locator]);
    put(offset::BANK_LOCATOR, &[values.bank_locator]);
    put(offset::MEMORY_TYPE, &[values.memory_type]);
    put(offset::TYPE_DETAIL, &values.type_detail.to_le_bytes());
    put(offset::SPEED, &values.speed.to_le_bytes());
    put(offset::MANUFACTURER, &[values.manufacturer]);
    put(offset::SERIAL_NUMBER, &[values.serial_number]);
    put(offset::ASSET_TAG, &[values.asset_tag]);
    put(offset::PART_NUMBER, &[values.part_number]);
    put(offset::ATTRIBUTES, &[values.attributes]);
    put(offset::EXTENDED_SIZE, &values.extended_size.to_le_bytes());
    put(offset::CONFIGURED_CLOCK_SPEED, &values.configured_clock_speed.to_le_bytes());
    put(offset::MINIMUM_VOLTAGE, &values.minimum_voltage.to_le_bytes());
    put(offset::MAXIMUM_VOLTAGE, &values.maximum_voltage.to_le_bytes());
    put(offset::CONFIGURED_VOLTAGE, &values.configured_voltage.to_le_bytes());

    body.truncate(declared_length);
    body.split_off(4)
}
