//! Per function code response decoders. Each one validates the response before
//! touching the payload and only writes into `data` once every check passed.

use crate::codec::request::MAX_WRITE_REGISTERS;
use crate::codec::utils::{deserialize_coils, deserialize_registers};
use crate::common::{ModbusDataType, ModbusDataUnit, ModbusTable};
use crate::messages::{FunctionCode, ModbusResponse};

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

/// Common guard for every decoder: structurally valid, not an exception and
/// answering `function_code`.
pub fn validate_response(response: &ModbusResponse, function_code: FunctionCode) -> Result<()> {
    if !response.is_valid() {
        return Err(anyhow!("Response PDU is malformed"));
    }
    if response.is_exception() {
        return Err(anyhow!("Response is an exception"));
    }
    if response.function_code() != u8::from(function_code) {
        return Err(anyhow!(
            "Expected function code {}, got {:#04X}",
            function_code,
            response.function_code()
        ));
    }
    Ok(())
}

pub fn is_response_valid(response: &ModbusResponse, function_code: FunctionCode) -> bool {
    validate_response(response, function_code).is_ok()
}

fn check_minimum_size(response: &ModbusResponse, function_code: FunctionCode) -> Result<()> {
    let minimum = ModbusResponse::minimum_data_size_for(function_code);
    if response.data_size() < minimum {
        return Err(anyhow!(
            "{} response too short, {} bytes but at least {} expected",
            function_code,
            response.data_size(),
            minimum
        ));
    }
    Ok(())
}

fn check_exact_size(response: &ModbusResponse, function_code: FunctionCode) -> Result<()> {
    let expected = ModbusResponse::minimum_data_size_for(function_code);
    if response.data_size() != expected {
        return Err(anyhow!(
            "{} response has {} bytes, {} expected",
            function_code,
            response.data_size(),
            expected
        ));
    }
    Ok(())
}

/// Reads the leading byte count and checks it covers the rest of the payload exactly.
fn read_byte_count(response: &ModbusResponse, data: &mut Cursor<&[u8]>) -> Result<usize> {
    let byte_count = data.read_u8()? as usize;

    if response.data_size() - 1 != byte_count {
        return Err(anyhow!(
            "Byte count {} doesn't match the {} bytes available",
            byte_count,
            response.data_size() - 1
        ));
    }
    Ok(byte_count)
}

fn process_read_bits_response(
    response: &ModbusResponse,
    function_code: FunctionCode,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    validate_response(response, function_code)?;
    check_minimum_size(response, function_code)?;

    let mut payload = Cursor::new(response.data());
    read_byte_count(response, &mut payload)?;

    if let Some(data) = data {
        let values = deserialize_coils(&response.data()[1..], data.value_count() as usize);
        data.set_values(values);
    }
    Ok(())
}

fn process_read_registers_response(
    response: &ModbusResponse,
    function_code: FunctionCode,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    validate_response(response, function_code)?;
    check_minimum_size(response, function_code)?;

    let mut payload = Cursor::new(response.data());
    let byte_count = read_byte_count(response, &mut payload)?;

    if byte_count % 2 != 0 {
        return Err(anyhow!("Byte count {} doesn't hold whole registers", byte_count));
    }

    let item_count = byte_count / 2;
    let values = deserialize_registers(item_count, &mut payload)?;

    let table = ModbusTable::get_table_from_function_code(function_code)
        .ok_or_else(|| anyhow!("Function code doesn't address any table"))?;

    if let Some(data) = data {
        data.set_values(values);
        data.set_value_count(item_count as u16);
        data.set_table(table);
    }
    Ok(())
}

pub fn process_read_coils_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    process_read_bits_response(response, FunctionCode::ReadCoils, data)
}

pub fn process_read_discrete_inputs_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    process_read_bits_response(response, FunctionCode::ReadDiscreteInputs, data)
}

pub fn process_read_holding_registers_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    process_read_registers_response(response, FunctionCode::ReadMultipleHoldingRegisters, data)
}

pub fn process_read_input_registers_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    process_read_registers_response(response, FunctionCode::ReadInputRegisters, data)
}

pub fn process_read_write_multiple_registers_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    process_read_registers_response(response, FunctionCode::ReadWriteMultipleRegisters, data)
}

pub fn process_write_single_coil_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    validate_response(response, FunctionCode::WriteSingleCoil)?;
    check_exact_size(response, FunctionCode::WriteSingleCoil)?;

    let mut payload = Cursor::new(response.data());
    let address = payload.read_u16::<BigEndian>()?;
    let raw_value = payload.read_u16::<BigEndian>()?;

    let ModbusDataType::Coil(value) = ModbusDataType::coil_from_representation(raw_value)? else {
        return Err(anyhow!("Coil representation decoded to a register"));
    };

    if let Some(data) = data {
        data.set_value_count(1);
        data.set_start_address(address);
        data.set_values(vec![u16::from(value)]);
        data.set_table(ModbusTable::Coils);
    }
    Ok(())
}

pub fn process_write_single_register_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    validate_response(response, FunctionCode::WriteSingleHoldingRegister)?;
    check_exact_size(response, FunctionCode::WriteSingleHoldingRegister)?;

    let mut payload = Cursor::new(response.data());
    let address = payload.read_u16::<BigEndian>()?;
    let value = payload.read_u16::<BigEndian>()?;

    if let Some(data) = data {
        data.set_value_count(1);
        data.set_start_address(address);
        data.set_values(vec![value]);
        data.set_table(ModbusTable::HoldingRegisters);
    }
    Ok(())
}

pub fn process_write_multiple_coils_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    validate_response(response, FunctionCode::WriteMultipleCoils)?;
    check_exact_size(response, FunctionCode::WriteMultipleCoils)?;

    let mut payload = Cursor::new(response.data());
    let address = payload.read_u16::<BigEndian>()?;
    let count = payload.read_u16::<BigEndian>()?;

    if let Some(data) = data {
        data.set_value_count(count);
        data.set_start_address(address);
        data.set_table(ModbusTable::Coils);
        data.fit_values_to_count();
    }
    Ok(())
}

pub fn process_write_multiple_registers_response(
    response: &ModbusResponse,
    data: Option<&mut ModbusDataUnit>,
) -> Result<()> {
    validate_response(response, FunctionCode::WriteMultipleHoldingRegisters)?;
    check_exact_size(response, FunctionCode::WriteMultipleHoldingRegisters)?;

    let mut payload = Cursor::new(response.data());
    let address = payload.read_u16::<BigEndian>()?;
    let count = payload.read_u16::<BigEndian>()?;

    // 1-123 registers per request
    if !(1..=MAX_WRITE_REGISTERS).contains(&count) {
        return Err(anyhow!("{} registers can't be written in one request", count));
    }

    if let Some(data) = data {
        data.set_start_address(address);
        data.set_value_count(count);
        data.set_table(ModbusTable::HoldingRegisters);
        data.fit_values_to_count();
    }
    Ok(())
}
