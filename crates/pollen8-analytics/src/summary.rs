use chrono::{DateTime, Duration, Utc};
use pollen8_core::{AnalyticsConfig, Connection, Pollen8Error, Result, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::network::{
    calculate_industry_distribution, calculate_network_growth, network_value_with,
    strength_breakdown, top_industries, IndustryShare, StrengthBreakdown,
};
use crate::round2;

/// Payload served for a user's network dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub total_connections: usize,
    pub total_value: f64,
    pub growth_rate: f64,
    pub top_industries: Vec<IndustryShare>,
    pub network_strength: f64,
}

/// Calculators bound to an explicit analytics configuration.
#[derive(Debug, Clone, Default)]
pub struct NetworkCalculator {
    config: AnalyticsConfig,
}

impl NetworkCalculator {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn network_value(&self, connections: &[Connection]) -> Result<f64> {
        Ok(network_value_with(connections, self.config.connection_value))
    }

    /// Connections made strictly before the start of the growth window.
    pub fn baseline_count(&self, connections: &[Connection], now: DateTime<Utc>) -> Result<usize> {
        let window = self.config.growth_window_days;
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(window)))
            .ok_or_else(|| {
                Pollen8Error::invalid_input(format!(
                    "growth window of {} days before {} is out of range",
                    window, now
                ))
            })?;
        Ok(connections
            .iter()
            .filter(|c| c.connected_at < cutoff)
            .count())
    }

    /// Growth of the whole network against its size one window ago.
    pub fn growth_rate(&self, connections: &[Connection], now: DateTime<Utc>) -> Result<f64> {
        let previous = self.baseline_count(connections, now)?;
        calculate_network_growth(connections.len() as f64, previous as f64)
    }

    pub fn strength(&self, user: &User, connections: &[Connection]) -> Result<StrengthBreakdown> {
        strength_breakdown(user, connections)
    }

    pub fn top_industries(&self, connections: &[Connection]) -> Result<Vec<IndustryShare>> {
        let distribution = calculate_industry_distribution(connections)?;
        Ok(top_industries(&distribution, self.config.top_industries))
    }

    pub fn summarize(
        &self,
        user: &User,
        connections: &[Connection],
        now: DateTime<Utc>,
    ) -> Result<NetworkSummary> {
        debug!(user = %user.id, connections = connections.len(), "summarizing network");

        let summary = NetworkSummary {
            total_connections: connections.len(),
            total_value: round2(self.network_value(connections)?),
            growth_rate: self.growth_rate(connections, now)?,
            top_industries: self.top_industries(connections)?,
            network_strength: self.strength(user, connections)?.total,
        };

        info!(
            user = %user.id,
            total_connections = summary.total_connections,
            growth_rate = summary.growth_rate,
            network_strength = summary.network_strength,
            "network summary computed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn connected_days_ago(days: i64, industries: &[&str]) -> Connection {
        Connection::new(Uuid::new_v4(), Uuid::new_v4(), now() - Duration::days(days))
            .with_industries(industries.iter().copied())
    }

    #[test]
    fn baseline_counts_connections_older_than_window() {
        let calc = NetworkCalculator::default();
        let conns = vec![
            connected_days_ago(90, &[]),
            connected_days_ago(31, &[]),
            connected_days_ago(30, &[]),
            connected_days_ago(10, &[]),
            connected_days_ago(1, &[]),
        ];
        // exactly 30 days old is inside the window
        assert_eq!(calc.baseline_count(&conns, now()).unwrap(), 2);
        assert_eq!(calc.growth_rate(&conns, now()).unwrap(), 150.0);
    }

    #[test]
    fn out_of_range_growth_window_is_invalid_input() {
        let calc = NetworkCalculator::new(AnalyticsConfig {
            growth_window_days: u32::MAX,
            ..AnalyticsConfig::default()
        });
        let conns = vec![connected_days_ago(1, &["Tech"])];

        assert!(calc.baseline_count(&conns, now()).unwrap_err().is_invalid_input());
        let err = calc
            .summarize(&User::new(Uuid::new_v4()), &conns, now())
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn growth_window_comes_from_config() {
        let calc = NetworkCalculator::new(AnalyticsConfig {
            growth_window_days: 7,
            ..AnalyticsConfig::default()
        });
        let conns = vec![
            connected_days_ago(20, &[]),
            connected_days_ago(10, &[]),
            connected_days_ago(8, &[]),
            connected_days_ago(2, &[]),
        ];
        // 4 now vs 3 a week ago
        assert_eq!(calc.growth_rate(&conns, now()).unwrap(), 33.33);
    }

    #[test]
    fn all_new_connections_use_zero_baseline_policy() {
        let calc = NetworkCalculator::default();
        let conns = vec![connected_days_ago(1, &[])];
        assert_eq!(calc.growth_rate(&conns, now()).unwrap(), 100.0);
        assert_eq!(calc.growth_rate(&[], now()).unwrap(), 0.0);
    }

    #[test]
    fn custom_connection_value_is_applied() {
        let calc = NetworkCalculator::new(AnalyticsConfig {
            connection_value: 2.0,
            ..AnalyticsConfig::default()
        });
        let conns = vec![connected_days_ago(1, &[]), connected_days_ago(2, &[])];
        assert_eq!(calc.network_value(&conns).unwrap(), 4.0);
    }

    #[test]
    fn summary_combines_all_calculators() {
        let calc = NetworkCalculator::new(AnalyticsConfig {
            top_industries: 2,
            ..AnalyticsConfig::default()
        });
        let user = User::new(Uuid::new_v4())
            .with_industries(["Tech"])
            .with_location(Some("Denver"), Some("80202"));
        let conns = vec![
            connected_days_ago(60, &["Tech"]),
            connected_days_ago(45, &["Tech", "Finance"]),
            connected_days_ago(5, &["Health"]),
            connected_days_ago(3, &["Finance"]),
            connected_days_ago(1, &["Tech"]),
        ];

        let summary = calc.summarize(&user, &conns, now()).unwrap();
        assert_eq!(summary.total_connections, 5);
        assert_eq!(summary.total_value, 15.7);
        assert_eq!(summary.growth_rate, 150.0);
        assert_eq!(summary.top_industries.len(), 2);
        assert_eq!(summary.top_industries[0].industry, "Tech");
        assert_eq!(summary.top_industries[0].percentage, 60.0);
        assert_eq!(summary.top_industries[1].industry, "Finance");
        // profile 5 + 0 + 20, connections 30 + 5
        assert_eq!(summary.network_strength, 60.0);
    }

    #[test]
    fn summary_serializes_as_camel_case() {
        let calc = NetworkCalculator::default();
        let summary = calc
            .summarize(&User::new(Uuid::new_v4()), &[], now())
            .unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalConnections"], 0);
        assert_eq!(json["totalValue"], 0.0);
        assert_eq!(json["growthRate"], 0.0);
        assert!(json["topIndustries"].as_array().unwrap().is_empty());
        assert_eq!(json["networkStrength"], 0.0);
    }
}
