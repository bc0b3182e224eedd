//! Signal strength and power conversions
//!
//! The MAC hardware reports received power as an attenuation in dB below
//! 0 dBm. Upper layers want dBm, an 802.15.4 energy level and an LQI.

/// Weakest input the receiver can report.
pub const RSSI_FLOOR_DBM: i8 = -100;

/// Input power mapped to the highest energy level.
const ED_CEILING_DBM: i8 = -40;

/// Input power mapped to the best link quality.
const LQI_CEILING_DBM: i8 = -20;

/// Lowest and highest output power of the PA.
pub const TX_POWER_MIN_DBM: i8 = -32;
pub const TX_POWER_MAX_DBM: i8 = 8;

/// Convert an RSSI register code to dBm.
pub const fn rssi_to_dbm(code: u8) -> i8 {
    if code >= 128 {
        i8::MIN
    } else {
        -(code as i8)
    }
}

/// Convert dBm to the attenuation code used by the RSSI and CCA registers.
pub const fn dbm_to_rssi(dbm: i8) -> u8 {
    if dbm >= 0 {
        0
    } else {
        (-(dbm as i16)) as u8
    }
}

/// Map `dbm` linearly from `[RSSI_FLOOR_DBM, ceiling]` onto `0..=255`.
const fn scale(dbm: i8, ceiling: i8) -> u8 {
    if dbm <= RSSI_FLOOR_DBM {
        0
    } else if dbm >= ceiling {
        u8::MAX
    } else {
        let span = (ceiling - RSSI_FLOOR_DBM) as i32;
        ((dbm - RSSI_FLOOR_DBM) as i32 * 255 / span) as u8
    }
}

/// Energy level reported by an ED scan.
pub const fn dbm_to_ed(dbm: i8) -> u8 {
    scale(dbm, ED_CEILING_DBM)
}

/// Link quality of a received frame.
pub const fn dbm_to_lqi(dbm: i8) -> u8 {
    scale(dbm, LQI_CEILING_DBM)
}

/// PA level for an output power, clamped to what the PA supports.
pub const fn tx_power_level(dbm: i8) -> u8 {
    let dbm = if dbm < TX_POWER_MIN_DBM {
        TX_POWER_MIN_DBM
    } else if dbm > TX_POWER_MAX_DBM {
        TX_POWER_MAX_DBM
    } else {
        dbm
    };
    (dbm - TX_POWER_MIN_DBM) as u8
}

/// Output power of a PA level.
pub const fn tx_power_dbm(level: u8) -> i8 {
    let level = if level > (TX_POWER_MAX_DBM - TX_POWER_MIN_DBM) as u8 {
        (TX_POWER_MAX_DBM - TX_POWER_MIN_DBM) as u8
    } else {
        level
    };
    level as i8 + TX_POWER_MIN_DBM
}

/// Received signal metrics attached to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkQuality {
    /// Received power in dBm
    pub rssi: i8,
    pub lqi: u8,
}

impl LinkQuality {
    pub const fn from_rssi_code(code: u8) -> Self {
        let rssi = rssi_to_dbm(code);
        Self {
            rssi,
            lqi: dbm_to_lqi(rssi),
        }
    }
}
