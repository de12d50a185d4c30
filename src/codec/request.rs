//! Builders turning data units into request PDUs. A unit that can't be expressed
//! on the wire yields `ModbusQuery::invalid()`, which the send path refuses.

use crate::codec::utils::{coil_byte_count, serialize_coils, serialize_registers};
use crate::common::{ModbusDataType, ModbusDataUnit, ModbusTable};
use crate::messages::{FunctionCode, ModbusQuery};

pub const MAX_READ_COILS: u16 = 2000;
pub const MAX_READ_REGISTERS: u16 = 125;
pub const MAX_WRITE_COILS: u16 = 1968;
pub const MAX_WRITE_REGISTERS: u16 = 123;
pub const MAX_READ_WRITE_READ_REGISTERS: u16 = 125;
pub const MAX_READ_WRITE_WRITE_REGISTERS: u16 = 121;

pub fn create_read_request(unit: &ModbusDataUnit) -> ModbusQuery {
    if !unit.is_valid() {
        return ModbusQuery::invalid();
    }

    let Some(function_code) = unit.table().read_function_code() else {
        return ModbusQuery::invalid();
    };

    // No response could carry more than this.
    let max_count = if unit.table().is_bit_table() {
        MAX_READ_COILS
    } else {
        MAX_READ_REGISTERS
    };
    if unit.value_count() > max_count {
        return ModbusQuery::invalid();
    }

    let mut read_query = Vec::with_capacity(4);

    //Starting Address
    read_query.extend_from_slice(&unit.start_address().to_be_bytes());

    //Ammount
    read_query.extend_from_slice(&unit.value_count().to_be_bytes());

    ModbusQuery::new(function_code, read_query)
}

pub fn create_write_request(unit: &ModbusDataUnit) -> ModbusQuery {
    if !unit.is_valid() || unit.values().len() < unit.value_count() as usize {
        return ModbusQuery::invalid();
    }

    let count = unit.value_count();
    let values = &unit.values()[..count as usize];

    match unit.table() {
        ModbusTable::Coils if count == 1 => {
            let mut single_write_query = Vec::with_capacity(4);

            //Address
            single_write_query.extend_from_slice(&unit.start_address().to_be_bytes());

            //Value
            let value = ModbusDataType::Coil(values[0] != 0).get_representation();
            single_write_query.extend_from_slice(&value.to_be_bytes());

            ModbusQuery::new(FunctionCode::WriteSingleCoil, single_write_query)
        }
        ModbusTable::Coils => {
            if count > MAX_WRITE_COILS {
                return ModbusQuery::invalid();
            }

            let mut multiple_write_query = Vec::new();

            //Starting Address
            multiple_write_query.extend_from_slice(&unit.start_address().to_be_bytes());

            //Ammount
            multiple_write_query.extend_from_slice(&count.to_be_bytes());

            //Byte count
            multiple_write_query.push(coil_byte_count(count as usize) as u8);

            //Values
            multiple_write_query.extend_from_slice(&serialize_coils(values));

            ModbusQuery::new(FunctionCode::WriteMultipleCoils, multiple_write_query)
        }
        ModbusTable::HoldingRegisters if count == 1 => {
            let mut single_write_query = Vec::with_capacity(4);

            //Address
            single_write_query.extend_from_slice(&unit.start_address().to_be_bytes());

            //Value
            single_write_query.extend_from_slice(&values[0].to_be_bytes());

            ModbusQuery::new(FunctionCode::WriteSingleHoldingRegister, single_write_query)
        }
        ModbusTable::HoldingRegisters => {
            if count > MAX_WRITE_REGISTERS {
                return ModbusQuery::invalid();
            }
            let Ok(register_bytes) = serialize_registers(values) else {
                return ModbusQuery::invalid();
            };

            let mut multiple_write_query = Vec::new();

            //Starting Address
            multiple_write_query.extend_from_slice(&unit.start_address().to_be_bytes());

            //Ammount
            multiple_write_query.extend_from_slice(&count.to_be_bytes());

            //Byte count
            multiple_write_query.push(register_bytes.len() as u8);

            //Values
            multiple_write_query.extend_from_slice(&register_bytes);

            ModbusQuery::new(FunctionCode::WriteMultipleHoldingRegisters, multiple_write_query)
        }
        ModbusTable::DiscreteInput | ModbusTable::InputRegisters | ModbusTable::Invalid => {
            ModbusQuery::invalid()
        }
    }
}

/// Function 23. Both ranges must address holding registers.
pub fn create_read_write_request(read: &ModbusDataUnit, write: &ModbusDataUnit) -> ModbusQuery {
    if read.table() != ModbusTable::HoldingRegisters
        || write.table() != ModbusTable::HoldingRegisters
    {
        return ModbusQuery::invalid();
    }

    if !read.is_valid()
        || !write.is_valid()
        || read.value_count() > MAX_READ_WRITE_READ_REGISTERS
        || write.value_count() > MAX_READ_WRITE_WRITE_REGISTERS
        || write.values().len() < write.value_count() as usize
    {
        return ModbusQuery::invalid();
    }

    let Ok(register_bytes) = serialize_registers(&write.values()[..write.value_count() as usize])
    else {
        return ModbusQuery::invalid();
    };

    let mut multiple_write_read_query = Vec::new();

    //Read Starting Address
    multiple_write_read_query.extend_from_slice(&read.start_address().to_be_bytes());

    //Read Ammount
    multiple_write_read_query.extend_from_slice(&read.value_count().to_be_bytes());

    //Write Starting Address
    multiple_write_read_query.extend_from_slice(&write.start_address().to_be_bytes());

    //Write Ammount
    multiple_write_read_query.extend_from_slice(&write.value_count().to_be_bytes());

    //Write Byte count
    multiple_write_read_query.push(register_bytes.len() as u8);

    //Write values
    multiple_write_read_query.extend_from_slice(&register_bytes);

    ModbusQuery::new(FunctionCode::ReadWriteMultipleRegisters, multiple_write_read_query)
}

/// Raw requests go out as given; the send path only checks `is_valid`.
pub fn create_raw_request(query: &ModbusQuery) -> ModbusQuery {
    query.clone()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::messages::MAX_PDU_DATA_SIZE;

    #[test]
    fn read_request_per_table() {
        let cases = [
            (ModbusTable::Coils, FunctionCode::ReadCoils),
            (ModbusTable::DiscreteInput, FunctionCode::ReadDiscreteInputs),
            (ModbusTable::InputRegisters, FunctionCode::ReadInputRegisters),
            (ModbusTable::HoldingRegisters, FunctionCode::ReadMultipleHoldingRegisters),
        ];

        for (table, function_code) in cases {
            let query = create_read_request(&ModbusDataUnit::new(table, 0x0102, 10));
            assert!(query.is_valid());
            assert_eq!(query.function_code(), u8::from(function_code));
            assert_eq!(query.data(), &[0x01, 0x02, 0x00, 0x0A]);
        }
    }

    #[test]
    fn read_ten_coils_at_zero() {
        let query = create_read_request(&ModbusDataUnit::new(ModbusTable::Coils, 0, 10));
        assert_eq!(query.data(), &[0x00, 0x00, 0x00, 0x0A]);
    }

    #[test]
    fn read_request_refuses_counts_no_response_can_carry() {
        for table in [ModbusTable::Coils, ModbusTable::DiscreteInput] {
            let unit = ModbusDataUnit::new(table, 0, MAX_READ_COILS);
            assert!(create_read_request(&unit).is_valid());
            let unit = ModbusDataUnit::new(table, 0, MAX_READ_COILS + 1);
            assert!(!create_read_request(&unit).is_valid());
        }

        for table in [ModbusTable::HoldingRegisters, ModbusTable::InputRegisters] {
            let unit = ModbusDataUnit::new(table, 0, MAX_READ_REGISTERS);
            assert!(create_read_request(&unit).is_valid());
            let unit = ModbusDataUnit::new(table, 0, MAX_READ_REGISTERS + 1);
            assert!(!create_read_request(&unit).is_valid());
        }
    }

    #[test]
    fn read_request_for_invalid_unit_is_invalid() {
        let query = create_read_request(&ModbusDataUnit::default());
        assert!(!query.is_valid());

        let query = create_read_request(&ModbusDataUnit::new(ModbusTable::Coils, 0, 0));
        assert!(!query.is_valid());
    }

    #[test]
    fn write_single_coil_on() {
        let query = create_write_request(&ModbusDataUnit::with_coils(5, &[true]));
        assert!(query.is_valid());
        assert_eq!(query.function_code(), u8::from(FunctionCode::WriteSingleCoil));
        assert_eq!(query.data(), &[0x00, 0x05, 0xFF, 0x00]);
    }

    #[test]
    fn write_single_coil_maps_any_non_zero_value_to_on() {
        let unit = ModbusDataUnit::with_values(ModbusTable::Coils, 1, vec![7]);
        assert_eq!(create_write_request(&unit).data(), &[0x00, 0x01, 0xFF, 0x00]);

        let unit = ModbusDataUnit::with_values(ModbusTable::Coils, 1, vec![0]);
        assert_eq!(create_write_request(&unit).data(), &[0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn write_multiple_coils_packs_bits() {
        let coils = [true, false, true, true, false, false, true, true, true, false];
        let query = create_write_request(&ModbusDataUnit::with_coils(0x13, &coils));

        assert!(query.is_valid());
        assert_eq!(query.function_code(), u8::from(FunctionCode::WriteMultipleCoils));
        assert_eq!(query.data(), &[0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01]);
    }

    #[test]
    fn write_single_register() {
        let unit = ModbusDataUnit::with_values(ModbusTable::HoldingRegisters, 1, vec![0x0003]);
        let query = create_write_request(&unit);

        assert_eq!(query.function_code(), u8::from(FunctionCode::WriteSingleHoldingRegister));
        assert_eq!(query.data(), &[0x00, 0x01, 0x00, 0x03]);
    }

    #[test]
    fn write_multiple_registers() {
        let unit =
            ModbusDataUnit::with_values(ModbusTable::HoldingRegisters, 1, vec![0x000A, 0x0102]);
        let query = create_write_request(&unit);

        assert!(query.is_valid());
        assert_eq!(query.function_code(), u8::from(FunctionCode::WriteMultipleHoldingRegisters));
        assert_eq!(query.data(), &[0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02]);
    }

    #[test]
    fn read_only_tables_are_not_writable() {
        let unit = ModbusDataUnit::with_values(ModbusTable::InputRegisters, 0, vec![1, 2]);
        assert!(!create_write_request(&unit).is_valid());

        let unit = ModbusDataUnit::with_values(ModbusTable::DiscreteInput, 0, vec![1]);
        assert!(!create_write_request(&unit).is_valid());
    }

    #[test]
    fn write_request_needs_a_value_per_element() {
        let unit = ModbusDataUnit::new(ModbusTable::HoldingRegisters, 0, 4);
        let mut short = unit.clone();
        short.set_values(vec![1, 2]);

        assert!(create_write_request(&unit).is_valid());
        assert!(!create_write_request(&short).is_valid());
    }

    #[test]
    fn write_request_refuses_counts_past_protocol_limits() {
        let registers =
            ModbusDataUnit::new(ModbusTable::HoldingRegisters, 0, MAX_WRITE_REGISTERS + 1);
        assert!(!create_write_request(&registers).is_valid());

        let registers =
            ModbusDataUnit::new(ModbusTable::HoldingRegisters, 0, MAX_WRITE_REGISTERS);
        assert!(create_write_request(&registers).is_valid());

        let coils = ModbusDataUnit::new(ModbusTable::Coils, 0, MAX_WRITE_COILS + 1);
        assert!(!create_write_request(&coils).is_valid());

        let coils = ModbusDataUnit::new(ModbusTable::Coils, 0, MAX_WRITE_COILS);
        let query = create_write_request(&coils);
        assert!(query.is_valid());
        assert_eq!(query.data()[4], 246);
    }

    #[test]
    fn read_write_request_layout() {
        let read = ModbusDataUnit::new(ModbusTable::HoldingRegisters, 0x0003, 6);
        let write = ModbusDataUnit::with_values(
            ModbusTable::HoldingRegisters,
            0x000E,
            vec![0x00FF, 0x00FF, 0x00FF],
        );
        let query = create_read_write_request(&read, &write);

        assert!(query.is_valid());
        assert_eq!(query.function_code(), u8::from(FunctionCode::ReadWriteMultipleRegisters));
        assert_eq!(
            query.data(),
            &[
                0x00, 0x03, 0x00, 0x06, 0x00, 0x0E, 0x00, 0x03, 0x06, 0x00, 0xFF, 0x00, 0xFF, 0x00,
                0xFF
            ]
        );
    }

    // Function 23 only addresses holding registers, so a single holding register
    // operand is not enough.
    #[test]
    fn read_write_request_requires_both_units_to_be_holding_registers() {
        let holding = ModbusDataUnit::with_values(ModbusTable::HoldingRegisters, 0, vec![1, 2]);
        let input = ModbusDataUnit::new(ModbusTable::InputRegisters, 0, 2);
        let coils = ModbusDataUnit::with_coils(0, &[true, false]);

        assert!(create_read_write_request(&holding, &holding).is_valid());
        assert!(!create_read_write_request(&input, &holding).is_valid());
        assert!(!create_read_write_request(&holding, &coils).is_valid());
        assert!(!create_read_write_request(&input, &coils).is_valid());
    }

    #[test]
    fn read_write_request_count_limits() {
        let holding = |count| ModbusDataUnit::new(ModbusTable::HoldingRegisters, 0, count);
        let small = holding(1);

        let query = create_read_write_request(&holding(MAX_READ_WRITE_READ_REGISTERS), &small);
        assert!(query.is_valid());

        let query = create_read_write_request(&holding(MAX_READ_WRITE_READ_REGISTERS + 1), &small);
        assert!(!query.is_valid());

        let query = create_read_write_request(&small, &holding(MAX_READ_WRITE_WRITE_REGISTERS));
        assert!(query.is_valid());
        assert_eq!(query.data()[8], 242);
        assert!(query.data_size() <= MAX_PDU_DATA_SIZE);

        let query = create_read_write_request(&small, &holding(MAX_READ_WRITE_WRITE_REGISTERS + 1));
        assert!(!query.is_valid());
    }

    #[test]
    fn raw_request_is_passed_through() {
        let query = ModbusQuery::new(0x41u8, vec![0x01, 0x02]);
        assert_eq!(create_raw_request(&query), query);
    }
}
