//! Synthesizing town halls that territorial units reference but the
//! town-hall dataset does not contain.

use std::collections::{HashMap, HashSet};

use crate::config::MissingTownHallPolicy;
use crate::dedupe::dedupe;
use crate::error::{ImportError, Result};
use crate::model::{Municipality, TerritorialUnit, TownHall};
use crate::schema::{code_prefix, MUNICIPALITY_CODE_LEN};

/// Town halls after reconciliation.
///
/// Only [`reconcile_town_halls`] builds this, and [`into_deduped`] is the
/// only way out, so persistence always sees the synthesized records
/// before duplicates are collapsed.
///
/// [`into_deduped`]: ReconciledTownHalls::into_deduped
#[derive(Debug)]
pub struct ReconciledTownHalls {
    town_halls: Vec<TownHall>,
    synthesized: usize,
}

impl ReconciledTownHalls {
    /// Number of town halls created for dangling references
    pub fn synthesized(&self) -> usize {
        self.synthesized
    }

    pub fn len(&self) -> usize {
        self.town_halls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.town_halls.is_empty()
    }

    /// Collapse repeated codes, keeping the first. Returns the records and
    /// the number of duplicates dropped.
    pub fn into_deduped(self) -> (Vec<TownHall>, usize) {
        let before = self.town_halls.len();
        let deduped = dedupe(self.town_halls);
        let dropped = before - deduped.len();
        (deduped, dropped)
    }
}

/// Append a placeholder town hall for every unit whose `town_hall_code`
/// is unknown.
///
/// The placeholder's municipality is the code prefix. Its name comes from
/// that municipality, or from the unit itself under
/// [`MissingTownHallPolicy::Fallback`].
pub fn reconcile_town_halls(
    town_halls: Vec<TownHall>,
    units: &[TerritorialUnit],
    municipalities: &[Municipality],
    policy: MissingTownHallPolicy,
) -> Result<ReconciledTownHalls> {
    let mut known: HashSet<String> = town_halls.iter().map(|th| th.code.clone()).collect();

    let mut municipality_names: HashMap<&str, &str> = HashMap::new();
    for m in municipalities {
        municipality_names
            .entry(m.code.as_str())
            .or_insert(m.name.as_str());
    }

    let mut missing = Vec::new();
    for unit in units {
        if known.contains(&unit.town_hall_code) {
            continue;
        }

        let municipality_code = code_prefix(&unit.town_hall_code, MUNICIPALITY_CODE_LEN);
        let name = match (municipality_names.get(municipality_code), policy) {
            (Some(name), _) => (*name).to_string(),
            (None, MissingTownHallPolicy::Fallback) => unit.name.clone(),
            (None, MissingTownHallPolicy::Fail) => {
                return Err(ImportError::UnresolvedTownHall {
                    ekatte: unit.ekatte.clone(),
                    town_hall_code: unit.town_hall_code.clone(),
                })
            }
        };

        known.insert(unit.town_hall_code.clone());
        missing.push(TownHall {
            code: unit.town_hall_code.clone(),
            name,
            municipality_code: municipality_code.to_string(),
        });
    }

    let synthesized = missing.len();
    let mut town_halls = town_halls;
    town_halls.extend(missing);

    Ok(ReconciledTownHalls {
        town_halls,
        synthesized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town_hall(code: &str, name: &str) -> TownHall {
        TownHall {
            code: code.into(),
            name: name.into(),
            municipality_code: code_prefix(code, MUNICIPALITY_CODE_LEN).into(),
        }
    }

    fn unit(ekatte: &str, name: &str, town_hall_code: &str) -> TerritorialUnit {
        TerritorialUnit {
            ekatte: ekatte.into(),
            name: name.into(),
            kind: None,
            town_hall_code: town_hall_code.into(),
        }
    }

    fn municipality(code: &str, name: &str) -> Municipality {
        Municipality {
            code: code.into(),
            name: name.into(),
            region_code: code_prefix(code, 3).into(),
        }
    }

    #[test]
    fn test_known_town_halls_are_untouched() {
        let out = reconcile_town_halls(
            vec![town_hall("BLG01-00", "Банско")],
            &[unit("02676", "Банско", "BLG01-00")],
            &[],
            MissingTownHallPolicy::Fail,
        )
        .unwrap();
        assert_eq!(out.synthesized(), 0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_missing_town_hall_takes_municipality_name() {
        let out = reconcile_town_halls(
            vec![],
            &[unit("68134", "гр. София", "SOF46-00")],
            &[municipality("SOF46", "Столична")],
            MissingTownHallPolicy::Fallback,
        )
        .unwrap();
        assert_eq!(out.synthesized(), 1);
        let (town_halls, _) = out.into_deduped();
        assert_eq!(
            town_halls,
            vec![TownHall {
                code: "SOF46-00".into(),
                name: "Столична".into(),
                municipality_code: "SOF46".into(),
            }]
        );
    }

    #[test]
    fn test_fallback_uses_unit_name() {
        let out = reconcile_town_halls(
            vec![],
            &[unit("00014", "Абланица", "BLG03-01")],
            &[municipality("SOF46", "Столична")],
            MissingTownHallPolicy::Fallback,
        )
        .unwrap();
        let (town_halls, _) = out.into_deduped();
        assert_eq!(town_halls[0].name, "Абланица");
        assert_eq!(town_halls[0].municipality_code, "BLG03");
    }

    #[test]
    fn test_fail_policy_reports_unresolved_reference() {
        let err = reconcile_town_halls(
            vec![],
            &[unit("00014", "Абланица", "BLG03-01")],
            &[],
            MissingTownHallPolicy::Fail,
        )
        .unwrap_err();
        match err {
            ImportError::UnresolvedTownHall {
                ekatte,
                town_hall_code,
            } => {
                assert_eq!(ekatte, "00014");
                assert_eq!(town_hall_code, "BLG03-01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_shared_missing_code_is_synthesized_once() {
        let out = reconcile_town_halls(
            vec![],
            &[
                unit("00014", "Абланица", "BLG03-01"),
                unit("00015", "Друго", "BLG03-01"),
            ],
            &[],
            MissingTownHallPolicy::Fallback,
        )
        .unwrap();
        assert_eq!(out.synthesized(), 1);
        let (town_halls, dropped) = out.into_deduped();
        assert_eq!(dropped, 0);
        assert_eq!(town_halls[0].name, "Абланица");
    }

    #[test]
    fn test_source_duplicates_are_collapsed_after_reconcile() {
        let out = reconcile_town_halls(
            vec![town_hall("BLG01-00", "Първо"), town_hall("BLG01-00", "Второ")],
            &[],
            &[],
            MissingTownHallPolicy::Fallback,
        )
        .unwrap();
        let (town_halls, dropped) = out.into_deduped();
        assert_eq!(dropped, 1);
        assert_eq!(town_halls[0].name, "Първо");
    }
}
