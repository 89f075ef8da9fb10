//! Classical registers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::BitIndex;

/// Named, growable classical bit arrays in declaration order.
///
/// A register's integer value is `Σ bit[i]·2^i`; bits past the 64th do not
/// contribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassicalRegisters {
    regs: IndexMap<String, Vec<bool>>,
}

impl ClassicalRegisters {
    /// Create an empty register set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or re-declare) `name` with `len` cleared bits; at least one.
    pub fn create(&mut self, name: impl Into<String>, len: usize) {
        self.regs.insert(name.into(), vec![false; len.max(1)]);
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.regs.contains_key(name)
    }

    /// Register bits, if declared.
    pub fn bits(&self, name: &str) -> Option<&[bool]> {
        self.regs.get(name).map(Vec::as_slice)
    }

    /// Iterate over `(name, bits)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[bool])> {
        self.regs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of declared registers.
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    /// Whether no register is declared.
    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Set one bit, creating and growing the register as needed.
    pub fn set_bit(&mut self, name: &str, bit: &BitIndex, value: bool) -> IrResult<()> {
        let (bit, len) = required_len(name, bit)?;
        let reg = self.regs.entry(name.to_string()).or_default();
        if len > reg.len() {
            reg.resize(len, false);
        }
        reg[bit] = value;
        Ok(())
    }

    /// Make sure `name` exists and holds at least `bit + 1` bits.
    /// Existing bit values are kept.
    pub fn ensure_bit(&mut self, name: &str, bit: &BitIndex) -> IrResult<()> {
        let (_, len) = required_len(name, bit)?;
        let reg = self.regs.entry(name.to_string()).or_default();
        if len > reg.len() {
            reg.resize(len, false);
        }
        Ok(())
    }

    /// Read one bit.
    pub fn get_bit(&self, name: &str, bit: &BitIndex) -> IrResult<bool> {
        let reg = self.get(name)?;
        let index = bit.resolve(name)?;
        reg.get(index).copied().ok_or_else(|| IrError::BitNotFound {
            register: name.to_string(),
            bit: index,
            len: reg.len(),
        })
    }

    /// Offset of `name` in the concatenation of all registers.
    pub fn base(&self, name: &str) -> IrResult<usize> {
        let index = self
            .regs
            .get_index_of(name)
            .ok_or_else(|| IrError::UnknownRegister(name.to_string()))?;
        Ok(self.regs.values().take(index).map(Vec::len).sum())
    }

    /// Total bits over all registers.
    pub fn total_bits(&self) -> usize {
        self.regs.values().map(Vec::len).sum()
    }

    /// Unsigned value of a register.
    pub fn value(&self, name: &str) -> IrResult<u64> {
        Ok(self
            .get(name)?
            .iter()
            .take(64)
            .enumerate()
            .filter(|(_, b)| **b)
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i)))
    }

    /// Clear every bit, keeping register lengths.
    pub fn reset(&mut self) {
        for reg in self.regs.values_mut() {
            reg.fill(false);
        }
    }

    fn get(&self, name: &str) -> IrResult<&Vec<bool>> {
        self.regs
            .get(name)
            .ok_or_else(|| IrError::UnknownRegister(name.to_string()))
    }
}

/// Resolve `bit` and the register length needed to hold it.
fn required_len(name: &str, bit: &BitIndex) -> IrResult<(usize, usize)> {
    let index = bit.resolve(name)?;
    let len = index.checked_add(1).ok_or_else(|| IrError::InvalidBitIndex {
        register: name.to_string(),
        found: bit.to_string(),
    })?;
    Ok((index, len))
}
