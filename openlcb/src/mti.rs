//! Message type indicators, protocol support bits and datagram error codes.

// Message network layer
pub const INITIALIZATION_COMPLETE: u16 = 0x100;
pub const INITIALIZATION_COMPLETE_SIMPLE: u16 = 0x101;
pub const VERIFY_NODE_ID_ADDRESSED: u16 = 0x488;
pub const VERIFY_NODE_ID_GLOBAL: u16 = 0x490;
pub const VERIFIED_NODE_ID: u16 = 0x170;
pub const VERIFIED_NODE_ID_SIMPLE: u16 = 0x171;
pub const OPTIONAL_INTERACTION_REJECTED: u16 = 0x068;
pub const TERMINATE_DUE_TO_ERROR: u16 = 0x0a8;
pub const PROTOCOL_SUPPORT_INQUIRY: u16 = 0x828;
pub const PROTOCOL_SUPPORT_REPLY: u16 = 0x668;

// Event transport
pub const PRODUCER_CONSUMER_EVENT_REPORT: u16 = 0x5b4;
pub const IDENTIFY_CONSUMER: u16 = 0x8f4;
pub const CONSUMER_IDENTIFIED_VALID: u16 = 0x4c4;
pub const CONSUMER_IDENTIFIED_INVALID: u16 = 0x4c5;
pub const CONSUMER_IDENTIFIED_UNKNOWN: u16 = 0x4c7;
pub const CONSUMER_RANGE_IDENTIFIED: u16 = 0x4a4;
pub const IDENTIFY_PRODUCER: u16 = 0x914;
pub const PRODUCER_IDENTIFIED_VALID: u16 = 0x544;
pub const PRODUCER_IDENTIFIED_INVALID: u16 = 0x545;
pub const PRODUCER_IDENTIFIED_UNKNOWN: u16 = 0x547;
pub const PRODUCER_RANGE_IDENTIFIED: u16 = 0x524;
pub const IDENTIFY_EVENTS_GLOBAL: u16 = 0x970;
pub const IDENTIFY_EVENTS_ADDRESSED: u16 = 0x968;
pub const LEARN_EVENT: u16 = 0x594;

// Datagram
pub const DATAGRAM_RECEIVED_OK: u16 = 0xa28;
pub const DATAGRAM_REJECTED: u16 = 0xa48;

// Simple node information
pub const SIMPLE_NODE_INFORMATION_REQUEST: u16 = 0xde8;
pub const SIMPLE_NODE_INFORMATION_REPLY: u16 = 0xa08;

/// Bit set in every MTI whose payload starts with a destination alias.
pub const ADDRESS_PRESENT: u16 = 0x0008;

pub fn is_addressed(mti: u16) -> bool {
    mti & ADDRESS_PRESENT != 0
}

/// Flag bits of the 24-bit protocol support reply.
pub mod protocol {
    pub const SIMPLE_PROTOCOL_SUBSET: u32 = 0x80_0000;
    pub const DATAGRAM: u32 = 0x40_0000;
    pub const STREAM: u32 = 0x20_0000;
    pub const MEMORY_CONFIGURATION: u32 = 0x10_0000;
    pub const RESERVATION: u32 = 0x08_0000;
    pub const PRODUCER_CONSUMER: u32 = 0x04_0000;
    pub const IDENTIFICATION: u32 = 0x02_0000;
    pub const TEACHING_LEARNING: u32 = 0x01_0000;
    pub const REMOTE_BUTTON: u32 = 0x00_8000;
    pub const ABBREVIATED_DEFAULT_CDI: u32 = 0x00_4000;
    pub const DISPLAY: u32 = 0x00_2000;
    pub const SIMPLE_NODE_INFORMATION: u32 = 0x00_1000;
    pub const CONFIGURATION_DESCRIPTION_INFORMATION: u32 = 0x00_0800;
    pub const TRACTION_CONTROL: u32 = 0x00_0400;
    pub const FUNCTION_DESCRIPTION_INFORMATION: u32 = 0x00_0200;
    pub const DCC_COMMAND_STATION: u32 = 0x00_0100;
    pub const SIMPLE_TRAIN_NODE_INFORMATION: u32 = 0x00_0080;
    pub const FUNCTION_CONFIGURATION: u32 = 0x00_0040;
    pub const FIRMWARE_UPGRADE: u32 = 0x00_0020;
    pub const FIRMWARE_UPGRADE_ACTIVE: u32 = 0x00_0010;

    pub const DEFAULT: u32 = DATAGRAM
        | MEMORY_CONFIGURATION
        | ABBREVIATED_DEFAULT_CDI
        | SIMPLE_NODE_INFORMATION
        | CONFIGURATION_DESCRIPTION_INFORMATION;
}

/// Error codes carried by Datagram Rejected. The high nibble is the category.
pub mod error_code {
    pub const PERMANENT: u16 = 0x1000;
    pub const PERMANENT_SOURCE_NOT_PERMITTED: u16 = 0x1020;
    pub const PERMANENT_NOT_IMPLEMENTED: u16 = 0x1040;
    pub const PERMANENT_SUBCOMMAND_UNKNOWN: u16 = 0x1041;
    pub const PERMANENT_DATAGRAM_TYPE_UNKNOWN: u16 = 0x1042;
    pub const PERMANENT_INVALID_ARGUMENTS: u16 = 0x1080;
    pub const TEMPORARY: u16 = 0x2000;
    pub const TEMPORARY_BUFFER_UNAVAILABLE: u16 = 0x2020;
    pub const TEMPORARY_OUT_OF_ORDER: u16 = 0x2040;

    pub fn is_temporary(code: u16) -> bool {
        code & 0xf000 == TEMPORARY
    }
}
