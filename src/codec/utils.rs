use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Bytes needed to carry `count` coils.
pub fn coil_byte_count(count: usize) -> usize {
    if count % 8 == 0 {
        count / 8
    } else {
        count / 8 + 1
    }
}

/// Packs coil states LSB first: coil `i` lands in bit `i % 8` of byte `i / 8`.
/// Any non zero element counts as "on". Unused bits of the last byte stay zero.
pub fn serialize_coils(values: &[u16]) -> Vec<u8> {
    let mut result = vec![0u8; coil_byte_count(values.len())];

    for (index, value) in values.iter().enumerate() {
        if *value != 0 {
            result[index / 8] |= 1 << (index % 8);
        }
    }
    result
}

/// Unpacks `ammount` coil states LSB first, zero filling when `data` carries fewer
/// bits. Padding bits past `ammount` are ignored.
pub fn deserialize_coils(data: &[u8], ammount: usize) -> Vec<u16> {
    let mut values = vec![0u16; ammount];

    let mut coil = 0;
    'bytes: for byte in data {
        for bit in 0..8 {
            if coil >= ammount {
                break 'bytes;
            }
            values[coil] = u16::from((byte >> bit) & 0b1);
            coil += 1;
        }
    }
    values
}

pub fn serialize_registers(values: &[u16]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(values.len() * 2);

    for value in values {
        result.write_u16::<BigEndian>(*value)?;
    }
    Ok(result)
}

/// Reads `ammount` big endian registers from the cursor.
pub fn deserialize_registers(ammount: usize, data: &mut Cursor<&[u8]>) -> Result<Vec<u16>> {
    let mut values = Vec::with_capacity(ammount);

    for index in 0..ammount {
        let value = data
            .read_u16::<BigEndian>()
            .map_err(|_| anyhow!("Register {} of {} is missing", index, ammount))?;
        values.push(value);
    }
    Ok(values)
}
