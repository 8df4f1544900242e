//! Re-validation of stored sites against the containment rules.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use sitefence::fence::{point_in_polygon, polygon_inside};
use sitefence::models::Location;

/// A stored record that would no longer pass validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    BoundaryTooSmall {
        location_id: i64,
        points: usize,
    },
    ZoneTooSmall {
        location_id: i64,
        zone_id: i64,
        points: usize,
    },
    ZoneOutsideBoundary {
        location_id: i64,
        zone_id: i64,
        vertices_outside: usize,
    },
    PoleOutsideZone {
        location_id: i64,
        zone_id: i64,
        pole_id: i64,
        pole_code: String,
    },
}

impl Violation {
    pub fn kind(&self) -> &'static str {
        match self {
            Violation::BoundaryTooSmall { .. } => "boundary_too_small",
            Violation::ZoneTooSmall { .. } => "zone_too_small",
            Violation::ZoneOutsideBoundary { .. } => "zone_outside_boundary",
            Violation::PoleOutsideZone { .. } => "pole_outside_zone",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub checked_at: DateTime<Utc>,
    pub locations: usize,
    pub zones: usize,
    pub poles: usize,
    pub cameras: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Violation counts keyed by kind
    pub fn summary(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for v in &self.violations {
            *counts.entry(v.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// Fail a `--strict` run that found violations
pub fn enforce_strict(report: &AuditReport, strict: bool) -> anyhow::Result<()> {
    if strict && !report.violations.is_empty() {
        anyhow::bail!("{} violations found", report.violations.len());
    }
    Ok(())
}

/// Check one location: its boundary, every zone against the boundary and
/// every pole against its zone.
pub fn audit_location(location: &Location) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !location.boundary.has_interior() {
        violations.push(Violation::BoundaryTooSmall {
            location_id: location.id,
            points: location.boundary.len(),
        });
    }

    for zone in &location.zones {
        if !zone.coordinates.has_interior() {
            violations.push(Violation::ZoneTooSmall {
                location_id: location.id,
                zone_id: zone.id,
                points: zone.coordinates.len(),
            });
        } else if !polygon_inside(&zone.coordinates, &location.boundary) {
            let vertices_outside = zone
                .coordinates
                .iter()
                .filter(|v| !point_in_polygon(**v, &location.boundary))
                .count();
            violations.push(Violation::ZoneOutsideBoundary {
                location_id: location.id,
                zone_id: zone.id,
                vertices_outside,
            });
        }

        for pole in &zone.poles {
            if !point_in_polygon(pole.position(), &zone.coordinates) {
                violations.push(Violation::PoleOutsideZone {
                    location_id: location.id,
                    zone_id: zone.id,
                    pole_id: pole.id,
                    pole_code: pole.code.clone(),
                });
            }
        }
    }

    if !violations.is_empty() {
        debug!(
            "Location {} has {} violations",
            location.id,
            violations.len()
        );
    }

    violations
}

/// Audit every location in parallel
pub fn audit_all(locations: &[Location], progress: &ProgressBar) -> AuditReport {
    let mut violations: Vec<Violation> = locations
        .par_iter()
        .flat_map_iter(|location| {
            let found = audit_location(location);
            progress.inc(1);
            found
        })
        .collect();

    // Stable output regardless of scheduling
    violations.sort_by_key(|v| match v {
        Violation::BoundaryTooSmall { location_id, .. } => (*location_id, 0, 0),
        Violation::ZoneTooSmall {
            location_id,
            zone_id,
            ..
        }
        | Violation::ZoneOutsideBoundary {
            location_id,
            zone_id,
            ..
        } => (*location_id, *zone_id, 0),
        Violation::PoleOutsideZone {
            location_id,
            zone_id,
            pole_id,
            ..
        } => (*location_id, *zone_id, *pole_id),
    });

    let zones = locations.iter().map(|l| l.zones.len()).sum();
    let poles = locations.iter().map(|l| l.pole_count()).sum();
    let cameras = locations
        .iter()
        .flat_map(|l| &l.zones)
        .flat_map(|z| &z.poles)
        .map(|p| p.cameras.len())
        .sum();

    AuditReport {
        checked_at: Utc::now(),
        locations: locations.len(),
        zones,
        poles,
        cameras,
        violations,
    }
}
