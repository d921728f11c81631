//! Reconciler
//!
//! Joins Google Ads spend with tracker revenue by campaign key and produces
//! the combined P/L rows. Pure: no I/O, no logging of its inputs.

use crate::domain::entities::report::{CombinedRow, Roi};
use crate::domain::entities::revenue::{Leads, RevenueRecord};
use crate::domain::entities::spend::SpendRecord;
use crate::domain::value_objects::campaign_key::{
    account_prefix, strip_domain_suffix, CampaignKey,
};
use std::collections::HashMap;

/// Records indexed by campaign key, in first-seen key order, last record wins
struct KeyedIndex<'a, T> {
    entries: Vec<(CampaignKey, &'a T)>,
    slots: HashMap<CampaignKey, usize>,
}

impl<'a, T> KeyedIndex<'a, T> {
    fn build(records: &'a [T], name_of: impl Fn(&'a T) -> &'a str) -> Self {
        let mut entries: Vec<(CampaignKey, &'a T)> = Vec::with_capacity(records.len());
        let mut slots: HashMap<CampaignKey, usize> = HashMap::with_capacity(records.len());

        for record in records {
            let Some(key) = CampaignKey::derive(name_of(record)) else {
                continue;
            };
            match slots.get(&key) {
                Some(&slot) => entries[slot].1 = record,
                None => {
                    slots.insert(key.clone(), entries.len());
                    entries.push((key, record));
                }
            }
        }

        Self { entries, slots }
    }

    fn get(&self, key: &CampaignKey) -> Option<&'a T> {
        self.slots.get(key).map(|&slot| self.entries[slot].1)
    }

    fn contains(&self, key: &CampaignKey) -> bool {
        self.slots.contains_key(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&CampaignKey, &'a T)> + '_ {
        self.entries.iter().map(|(key, record)| (key, *record))
    }
}

/// Reconcile spend and revenue into combined rows.
///
/// Rows come out sorted case-insensitively by (account, campaign) with `id`
/// set to the row position. Rows with neither a name nor any money are
/// dropped, as are records whose name yields no campaign key.
pub fn reconcile(spend: &[SpendRecord], revenue: &[RevenueRecord]) -> Vec<CombinedRow> {
    let spend_index = KeyedIndex::build(spend, |record| record.campaign_name.as_str());
    let revenue_index = KeyedIndex::build(revenue, |record| record.name.as_str());

    let mut rows: Vec<CombinedRow> = Vec::new();

    for (key, rev) in revenue_index.iter() {
        if let Some(sp) = spend_index.get(key) {
            rows.push(matched_row(sp, rev));
        }
    }
    rows.extend(
        revenue_index
            .iter()
            .filter(|(key, _)| !spend_index.contains(key))
            .map(|(_, rev)| revenue_only_row(rev)),
    );
    rows.extend(
        spend_index
            .iter()
            .filter(|(key, _)| !revenue_index.contains(key))
            .map(|(_, sp)| spend_only_row(sp)),
    );

    let mut keyed: Vec<((String, String), CombinedRow)> = rows
        .into_iter()
        .filter(|row| row.has_identity() && row.has_activity())
        .map(|row| {
            (
                (
                    row.account_name.to_lowercase(),
                    row.campaign_name.to_lowercase(),
                ),
                row,
            )
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    keyed
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut row))| {
            row.id = position;
            row
        })
        .collect()
}

fn matched_row(spend: &SpendRecord, revenue: &RevenueRecord) -> CombinedRow {
    let account = if spend.account_name.is_empty() {
        account_prefix(&revenue.name).unwrap_or_default()
    } else {
        spend.account_name.as_str()
    };

    CombinedRow::new(
        account.to_string(),
        strip_domain_suffix(&revenue.name).to_string(),
        spend.cost,
        revenue.revenue,
        Roi::from_totals(revenue.revenue, spend.cost),
        revenue.leads.clone(),
    )
}

fn revenue_only_row(revenue: &RevenueRecord) -> CombinedRow {
    CombinedRow::new(
        account_prefix(&revenue.name).unwrap_or_default().to_string(),
        strip_domain_suffix(&revenue.name).to_string(),
        0.0,
        revenue.revenue,
        Roi::empty(),
        revenue.leads.clone(),
    )
}

fn spend_only_row(spend: &SpendRecord) -> CombinedRow {
    let account = if spend.account_name.is_empty() {
        account_prefix(&spend.campaign_name).unwrap_or_default()
    } else {
        spend.account_name.as_str()
    };

    CombinedRow::new(
        account.to_string(),
        strip_domain_suffix(&spend.campaign_name).to_string(),
        spend.cost,
        0.0,
        Roi::total_loss(),
        Leads::default(),
    )
}
