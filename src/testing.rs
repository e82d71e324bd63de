use std::collections::{HashMap, VecDeque};

use crate::i2cio::Transport;

const STATUS: u8 = 0xf3;
const CTRL_MEAS: u8 = 0xf4;
const MODE_MASK: u8 = 0x03;

fn is_forced(ctrl_meas: u8) -> bool {
    matches!(ctrl_meas & MODE_MASK, 0x01 | 0x02)
}

/// In-memory register file standing in for a device on the bus.
///
/// Reads return consecutive registers starting at the requested address,
/// writes are recorded and stored. A queued status sequence overrides the
/// stored value of the status register until it runs dry. After a write of
/// forced mode, ctrl_meas reports forced mode for `forced_mode_reads` reads and
/// then falls back to sleep mode like the device does.
pub struct FakeBus {
    pub dev_addr: u16,
    pub regs: HashMap<u8, u8>,
    pub writes: Vec<(u8, u8)>,
    pub status_sequence: VecDeque<u8>,
    pub short_reads: HashMap<u8, usize>,
    pub forced_mode_reads: usize,
    forced_reads_left: usize,
}

impl FakeBus {
    pub fn new(dev_addr: u16) -> Self {
        FakeBus {
            dev_addr,
            regs: HashMap::new(),
            writes: Vec::new(),
            status_sequence: VecDeque::new(),
            short_reads: HashMap::new(),
            forced_mode_reads: 0,
            forced_reads_left: 0,
        }
    }

    pub fn with_block(&mut self, register: u8, data: &[u8]) -> &mut Self {
        for (i, val) in data.iter().enumerate() {
            self.regs.insert(register + i as u8, *val);
        }
        self
    }

    fn check_addr(&self, dev_addr: u16) -> Result<(), std::io::Error> {
        if dev_addr != self.dev_addr {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no device at address"));
        }
        Ok(())
    }
}

impl Transport for FakeBus {
    fn write_register(&mut self, dev_addr: u16, register: u8, value: u8) -> Result<(), std::io::Error> {
        self.check_addr(dev_addr)?;
        self.writes.push((register, value));
        if register == CTRL_MEAS && is_forced(value) {
            self.forced_reads_left = self.forced_mode_reads;
        }
        self.regs.insert(register, value);
        Ok(())
    }

    fn read_registers(&mut self, dev_addr: u16, register: u8, len: usize) -> Result<Vec<u8>, std::io::Error> {
        self.check_addr(dev_addr)?;
        if register == STATUS {
            if let Some(status) = self.status_sequence.pop_front() {
                return Ok(vec![status]);
            }
        }
        if register == CTRL_MEAS {
            let ctrl_meas = *self.regs.get(&CTRL_MEAS).unwrap_or(&0);
            if is_forced(ctrl_meas) {
                if self.forced_reads_left == 0 {
                    self.regs.insert(CTRL_MEAS, ctrl_meas & !MODE_MASK);
                } else {
                    self.forced_reads_left -= 1;
                }
            }
        }
        let len = self.short_reads.get(&register).copied().unwrap_or(len);
        Ok((0..len).map(|i| *self.regs.get(&(register + i as u8)).unwrap_or(&0)).collect())
    }
}
