// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! Periodic scanning and the `MediaReport` it produces.
//!
//! Grounded in `ShimWifiIPCProcessImpl::push_scan_results`, which parses
//! `wpa_cli scan_results` lines (`bssid/frequency/signal/flags/ssid`) into
//! one `rina::MediaDIFInfo` per SSID, each carrying the access points seen
//! for it. The distilled spec only says "signal strength and security
//! attributes"; the concrete `flags` enum is recovered here from the
//! original's `wpa_supplicant` flag vocabulary.
use std::collections::HashMap;

/// Security capability a scanned access point advertises, parsed from
/// `wpa_cli`'s `flags` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AccessPointSecurity {
    Open,
    Wpa,
    Wpa2,
    Wpa3,
}

/// One access point observed for a given DIF (SSID) during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub bssid: String,
    pub signal_strength: i32,
    pub security: AccessPointSecurity,
}

/// Every access point seen for one DIF (SSID) in a single scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDifInfo {
    pub dif_name: String,
    pub access_points: Vec<ScanResult>,
}

/// The report published upward after a scan completes, keyed by DIF
/// (SSID) name, mirroring `rina::MediaReport::available_difs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaReport {
    pub current_dif_name: Option<String>,
    pub available_difs: HashMap<String, MediaDifInfo>,
}

impl MediaReport {
    #[must_use]
    pub fn new(current_dif_name: Option<String>) -> Self {
        Self {
            current_dif_name,
            available_difs: HashMap::new(),
        }
    }

    /// Folds one scanned access point into the report, grouping by the
    /// DIF it advertises, the same accumulation
    /// `push_scan_results` performs line by line.
    pub fn record(&mut self, dif_name: &str, ap: ScanResult) {
        self.available_difs
            .entry(dif_name.to_owned())
            .or_insert_with(|| MediaDifInfo {
                dif_name: dif_name.to_owned(),
                access_points: Vec::new(),
            })
            .access_points
            .push(ap);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn record_groups_access_points_by_dif_name() {
        let mut report = MediaReport::new(None);
        report.record(
            "mydif",
            ScanResult {
                bssid: "aa:bb:cc:dd:ee:ff".to_owned(),
                signal_strength: -40,
                security: AccessPointSecurity::Wpa2,
            },
        );
        report.record(
            "mydif",
            ScanResult {
                bssid: "11:22:33:44:55:66".to_owned(),
                signal_strength: -70,
                security: AccessPointSecurity::Wpa3,
            },
        );
        report.record(
            "otherdif",
            ScanResult {
                bssid: "de:ad:be:ef:00:01".to_owned(),
                signal_strength: -55,
                security: AccessPointSecurity::Open,
            },
        );

        assert_eq!(report.available_difs["mydif"].access_points.len(), 2);
        assert_eq!(report.available_difs["otherdif"].access_points.len(), 1);
    }
}
