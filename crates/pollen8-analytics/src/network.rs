//! Network value, growth, industry distribution and strength calculators.
//!
//! All functions are pure; the same inputs always produce the same outputs.

use pollen8_core::{Connection, Pollen8Error, Result, User, CONNECTION_VALUE};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::round2;

const MAX_LIST_POINTS: f64 = 15.0;
const POINTS_PER_ITEM: f64 = 5.0;
const FULL_LIST_LEN: usize = 3;
const LOCATION_FULL_POINTS: f64 = 20.0;
const LOCATION_PARTIAL_POINTS: f64 = 10.0;
const MAX_VALUE_POINTS: f64 = 30.0;
const VALUE_SCALE: f64 = 10.0;
const MAX_COUNT_POINTS: f64 = 20.0;

/// Total network value using the default per-connection weight.
pub fn calculate_network_value(connections: &[Connection]) -> Result<f64> {
    Ok(network_value_with(connections, CONNECTION_VALUE))
}

pub(crate) fn network_value_with(connections: &[Connection], weight: f64) -> f64 {
    let value = connections.len() as f64 * weight;
    debug!(connections = connections.len(), value, "network value");
    value
}

/// Percentage change from `previous` to `current`, rounded to 2 decimals.
///
/// A zero baseline yields `100` when anything was gained and `0` otherwise.
pub fn calculate_network_growth(current: f64, previous: f64) -> Result<f64> {
    ensure_numeric("current", current)?;
    ensure_numeric("previous", previous)?;

    if previous == 0.0 {
        return Ok(if current > 0.0 { 100.0 } else { 0.0 });
    }

    let growth = round2((current - previous) / previous * 100.0);
    debug!(current, previous, growth, "network growth");
    Ok(growth)
}

fn ensure_numeric(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        warn!(argument = name, "rejecting non-finite growth input");
        return Err(Pollen8Error::invalid_input(format!(
            "{} must be a finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Share of connections tagged with each industry.
///
/// The base is the number of connections, so multi-tagged connections can push
/// the total above 100.
pub fn calculate_industry_distribution(connections: &[Connection]) -> Result<BTreeMap<String, f64>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for connection in connections {
        for industry in &connection.industries {
            *counts.entry(industry.clone()).or_insert(0) += 1;
        }
    }

    let total = connections.len() as f64;
    let distribution: BTreeMap<String, f64> = counts
        .into_iter()
        .map(|(industry, count)| (industry, round2(count as f64 / total * 100.0)))
        .collect();

    debug!(
        connections = connections.len(),
        industries = distribution.len(),
        "industry distribution"
    );
    Ok(distribution)
}

/// One industry's share of a user's connections.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndustryShare {
    pub industry: String,
    pub percentage: f64,
}

/// Highest shares first; ties broken by name so the order is stable.
pub fn top_industries(distribution: &BTreeMap<String, f64>, limit: usize) -> Vec<IndustryShare> {
    let mut shares: Vec<IndustryShare> = distribution
        .iter()
        .map(|(industry, percentage)| IndustryShare {
            industry: industry.clone(),
            percentage: *percentage,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.industry.cmp(&b.industry))
    });
    shares.truncate(limit);
    shares
}

/// Both halves of the strength score.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrengthBreakdown {
    /// Profile completeness, 0-50
    pub profile: f64,
    /// Connection quality, 0-50
    pub connections: f64,
    pub total: f64,
}

pub fn calculate_network_strength(user: &User, connections: &[Connection]) -> Result<f64> {
    Ok(strength_breakdown(user, connections)?.total)
}

pub fn strength_breakdown(user: &User, connections: &[Connection]) -> Result<StrengthBreakdown> {
    let profile = profile_score(user);
    let quality = connection_score(connections)?;
    let breakdown = StrengthBreakdown {
        profile,
        connections: quality,
        total: round2(profile + quality),
    };
    debug!(
        user = %user.id,
        profile = breakdown.profile,
        connections = breakdown.connections,
        total = breakdown.total,
        "network strength"
    );
    Ok(breakdown)
}

fn list_points(len: usize) -> f64 {
    if len >= FULL_LIST_LEN {
        MAX_LIST_POINTS
    } else {
        POINTS_PER_ITEM * len as f64
    }
}

fn profile_score(user: &User) -> f64 {
    let location = match (user.has_city(), user.has_zip_code()) {
        (true, true) => LOCATION_FULL_POINTS,
        (true, false) | (false, true) => LOCATION_PARTIAL_POINTS,
        (false, false) => 0.0,
    };
    list_points(user.industries.len()) + list_points(user.interests.len()) + location
}

fn connection_score(connections: &[Connection]) -> Result<f64> {
    if connections.is_empty() {
        return Ok(0.0);
    }

    let mut total_value = 0.0;
    for connection in connections {
        let value = connection.connection_value;
        if !value.is_finite() || value < 0.0 {
            warn!(connection = %connection.id, value, "rejecting connection value");
            return Err(Pollen8Error::invalid_input(format!(
                "connection {} has invalid connection_value {}",
                connection.id, value
            )));
        }
        total_value += value;
    }

    let count = connections.len() as f64;
    let average = total_value / count;
    Ok((average * VALUE_SCALE).min(MAX_VALUE_POINTS) + count.min(MAX_COUNT_POINTS))
}
