use crate::messages::FunctionCode;

use anyhow::{anyhow, Result};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ModbusDataType {
    Coil(bool),
    Register(u16),
}

impl ModbusDataType {
    pub fn get_representation(&self) -> u16 {
        match self {
            ModbusDataType::Coil(value) => {
                if *value {
                    0xFF00
                } else {
                    0x0000
                }
            }
            ModbusDataType::Register(value) => *value,
        }
    }

    pub fn coil_from_representation(raw_value: u16) -> Result<Self> {
        match raw_value {
            0xFF00 => Ok(ModbusDataType::Coil(true)),
            0x0000 => Ok(ModbusDataType::Coil(false)),
            _ => Err(anyhow!(
                "{:#06X} can't be decoded to a coil, only valid values are 0xFF00 and 0x0000",
                raw_value
            )),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, Default)]
pub enum ModbusTable {
    #[default]
    Invalid,
    DiscreteInput,
    Coils,
    InputRegisters,
    HoldingRegisters,
}

impl ModbusTable {
    pub fn get_table_from_function_code(function_code: FunctionCode) -> Option<ModbusTable> {
        match function_code {
            FunctionCode::WriteSingleCoil
            | FunctionCode::ReadCoils
            | FunctionCode::WriteMultipleCoils => Some(ModbusTable::Coils),
            FunctionCode::WriteSingleHoldingRegister
            | FunctionCode::ReadMultipleHoldingRegisters
            | FunctionCode::WriteMultipleHoldingRegisters
            | FunctionCode::ReadWriteMultipleRegisters => Some(ModbusTable::HoldingRegisters),
            FunctionCode::ReadInputRegisters => Some(ModbusTable::InputRegisters),
            FunctionCode::ReadDiscreteInputs => Some(ModbusTable::DiscreteInput),
            _ => None,
        }
    }

    pub fn read_function_code(&self) -> Option<FunctionCode> {
        match self {
            ModbusTable::Coils => Some(FunctionCode::ReadCoils),
            ModbusTable::DiscreteInput => Some(FunctionCode::ReadDiscreteInputs),
            ModbusTable::InputRegisters => Some(FunctionCode::ReadInputRegisters),
            ModbusTable::HoldingRegisters => Some(FunctionCode::ReadMultipleHoldingRegisters),
            ModbusTable::Invalid => None,
        }
    }

    pub fn is_bit_table(&self) -> bool {
        matches!(self, ModbusTable::Coils | ModbusTable::DiscreteInput)
    }
}

/// One contiguous range of a single table. Coil tables store one element per coil,
/// holding 0 or 1.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ModbusDataUnit {
    table: ModbusTable,
    start_address: u16,
    value_count: u16,
    values: Vec<u16>,
}

impl ModbusDataUnit {
    /// A range of `value_count` zeroed elements.
    pub fn new(table: ModbusTable, start_address: u16, value_count: u16) -> Self {
        ModbusDataUnit {
            table,
            start_address,
            value_count,
            values: vec![0; value_count as usize],
        }
    }

    /// A range holding exactly `values`. Anything past `u16::MAX` elements is dropped.
    pub fn with_values(table: ModbusTable, start_address: u16, mut values: Vec<u16>) -> Self {
        values.truncate(u16::MAX as usize);
        ModbusDataUnit {
            table,
            start_address,
            value_count: values.len() as u16,
            values,
        }
    }

    pub fn with_coils(start_address: u16, coils: &[bool]) -> Self {
        let values = coils.iter().map(|coil| u16::from(*coil)).collect();
        Self::with_values(ModbusTable::Coils, start_address, values)
    }

    pub fn table(&self) -> ModbusTable {
        self.table
    }

    pub fn set_table(&mut self, table: ModbusTable) {
        self.table = table;
    }

    pub fn start_address(&self) -> u16 {
        self.start_address
    }

    pub fn set_start_address(&mut self, start_address: u16) {
        self.start_address = start_address;
    }

    pub fn value_count(&self) -> u16 {
        self.value_count
    }

    pub fn set_value_count(&mut self, value_count: u16) {
        self.value_count = value_count;
    }

    pub fn values(&self) -> &[u16] {
        &self.values
    }

    pub fn set_values(&mut self, values: Vec<u16>) {
        self.values = values;
    }

    pub fn value(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied()
    }

    /// Values as coil states, `None` for register tables.
    pub fn coils(&self) -> Option<Vec<bool>> {
        if !self.table.is_bit_table() {
            return None;
        }
        Some(self.values.iter().map(|value| *value != 0).collect())
    }

    /// Keeps `values` in step with `value_count`, zero filling new elements.
    pub(crate) fn fit_values_to_count(&mut self) {
        self.values.resize(self.value_count as usize, 0);
    }

    /// A recognised table, at least one element and a range that stays inside the
    /// 16 bit address space.
    pub fn is_valid(&self) -> bool {
        self.table != ModbusTable::Invalid
            && self.value_count > 0
            && self.start_address as u32 + self.value_count as u32 <= 0x1_0000
    }
}
