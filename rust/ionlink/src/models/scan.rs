use crate::errors::SchemaError;
use nohash_hasher::BuildNoHashHasher;
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

/// Link from an MS2 scan back to the MS1 scan it was sampled from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PrecursorLink {
    pub ms1_scan: u32,
    pub ms1_mz: f64,
    pub ms1_intensity: f64,
}

/// One spectrum acquired by the instrument, as handed over by an
/// external spectral-file reader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanRecord {
    pub scan_num: u32,
    pub ms_level: u8,
    pub retention_time: f64,
    pub total_ion_current: f64,
    pub injection_time_ms: f64,
    pub precursor: Option<PrecursorLink>,
}

impl ScanRecord {
    /// Ions accumulated during the scan: TIC * injection time / 1000.
    pub fn derived_ions(&self) -> f64 {
        self.total_ion_current * self.injection_time_ms / 1000.0
    }
}

/// Scan metadata with O(1) lookup by scan number.
///
/// Scan numbers are unique within a run; a duplicate is a schema
/// violation, not something to be merged quietly.
#[derive(Debug, Clone, Default)]
pub struct ScanTable {
    records: Vec<ScanRecord>,
    by_scan: HashMap<u32, usize, BuildNoHashHasher<u32>>,
}

impl ScanTable {
    pub fn new(records: Vec<ScanRecord>) -> Result<Self, SchemaError> {
        let mut by_scan =
            HashMap::with_capacity_and_hasher(records.len(), BuildNoHashHasher::default());
        for (idx, rec) in records.iter().enumerate() {
            if let Some(prev) = by_scan.insert(rec.scan_num, idx) {
                let prev_rec: &ScanRecord = &records[prev];
                return Err(SchemaError::DuplicateScanKey {
                    scan_num: rec.scan_num,
                    first_rt: prev_rec.retention_time,
                    second_rt: rec.retention_time,
                });
            }
        }
        Ok(Self { records, by_scan })
    }

    pub fn get(&self, scan_num: u32) -> Option<&ScanRecord> {
        self.by_scan.get(&scan_num).map(|idx| &self.records[*idx])
    }

    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(scan_num: u32, rt: f64) -> ScanRecord {
        ScanRecord {
            scan_num,
            ms_level: 1,
            retention_time: rt,
            total_ion_current: 1e6,
            injection_time_ms: 50.0,
            precursor: None,
        }
    }

    #[test]
    fn test_lookup_by_scan_number() {
        let table = ScanTable::new(vec![scan(10, 1.0), scan(11, 1.1)]).unwrap();
        assert_eq!(table.get(11).unwrap().retention_time, 1.1);
        assert!(table.get(12).is_none());
    }

    #[test]
    fn test_duplicate_scan_rejected() {
        let err = ScanTable::new(vec![scan(10, 1.0), scan(10, 2.0)]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateScanKey { scan_num: 10, .. }));
    }

    #[test]
    fn test_derived_ions() {
        let rec = scan(10, 1.0);
        assert!((rec.derived_ions() - 1e6 * 50.0 / 1000.0).abs() < 1e-9);
    }
}
