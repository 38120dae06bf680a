use avr_device::atmega128rfa1::EEPROM;

const EERE: u8 = 1 << 0;
const EEPE: u8 = 1 << 1;

pub struct Eeprom {
    _private: (),
}

impl Eeprom {
    pub fn new() -> Self {
        Self { _private: () }
    }

    pub fn read_byte(&self, address: u16) -> u8 {
        unsafe {
            let p = EEPROM::ptr();
            // Wait for a pending write
            while (*p).eecr.read().bits() & EEPE != 0 {}
            (*p).eear.write(|w| w.bits(address));
            (*p).eecr.modify(|r, w| w.bits(r.bits() | EERE));
            (*p).eedr.read().bits()
        }
    }

    /// Little endian word starting at `address`
    pub fn read_u32(&self, address: u16) -> u32 {
        let mut bytes = [0u8; 4];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_byte(address + i as u16);
        }
        u32::from_le_bytes(bytes)
    }
}

impl Default for Eeprom {
    fn default() -> Self {
        Self::new()
    }
}
