//! Terminal rendering: aligned tables by default, pretty JSON with `--json`.

use std::fmt::Write as _;

use serde::Serialize;

use tierlist_engine::ScoredRecord;
use tierlist_search::{AttributeStats, SearchPage};

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    pub fn page(&self, page: &SearchPage) -> anyhow::Result<()> {
        if self.json {
            return print_json(page);
        }
        print!("{}", records_table(&page.items));
        println!("{} of {} matching records", page.items.len(), page.total);
        Ok(())
    }

    pub fn records(&self, records: &[ScoredRecord]) -> anyhow::Result<()> {
        if self.json {
            return print_json(&records);
        }
        print!("{}", records_table(records));
        Ok(())
    }

    pub fn record(&self, record: &ScoredRecord) -> anyhow::Result<()> {
        if self.json {
            return print_json(record);
        }
        print!("{}", record_detail(record));
        Ok(())
    }

    pub fn stats(&self, stats: &[AttributeStats]) -> anyhow::Result<()> {
        if self.json {
            return print_json(&stats);
        }
        print!("{}", stats_table(stats));
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn records_table(records: &[ScoredRecord]) -> String {
    let mut out = format!(
        "{:>8}  {:<28} {:<7} {:>10} {:>7} {:>5}\n",
        "ID", "NAME", "TIER", "EFFICIENCY", "PURITY", "COST"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:>8}  {:<28} {:<7} {:>10.4} {:>7.2} {:>5}",
            r.record.id.0,
            truncate(&r.record.name, 28),
            r.tier_label().label(),
            r.metrics.efficiency,
            r.metrics.purity,
            r.record.cost,
        );
    }
    out
}

pub fn record_detail(r: &ScoredRecord) -> String {
    let m = &r.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{}) in {}", r.record.name, r.record.id, r.record.scope);
    let _ = writeln!(out, "  tier          {}", r.tier_label().label());
    let _ = writeln!(out, "  cost          {}", r.record.cost);
    let _ = writeln!(out, "  efficiency    {:.4}", m.efficiency);
    let _ = writeln!(out, "  power score   {:.4}", m.power_score);
    let _ = writeln!(
        out,
        "  fighter       {:.4} ({:.1}%)",
        m.fighter_score, m.fighter_percent
    );
    let _ = writeln!(
        out,
        "  crafter       {:.4} ({:.1}%)",
        m.crafter_score, m.crafter_percent
    );
    let _ = writeln!(out, "  purity        {:.2}", m.purity);
    let _ = writeln!(out, "  tier-2 count  {}", m.tier2_count);
    if m.has_rare_attribute {
        let _ = writeln!(out, "  rare attribute");
    }
    for a in &r.record.attributes {
        let _ = writeln!(out, "    {:<8} {}", a.identifier, a.magnitude);
    }
    if !m.unrecognized.is_empty() {
        let _ = writeln!(out, "  ignored: {}", m.unrecognized.join(", "));
    }
    out
}

pub fn stats_table(stats: &[AttributeStats]) -> String {
    let mut out = format!(
        "{:<6} {:<10} {:>7} {:>9} {:>10}  {:>4} {:>4} {:>4}\n",
        "ATTR", "CATEGORY", "RECORDS", "AVG MAG", "AVG EFF", "BEST", "MID", "LOW"
    );
    for s in stats {
        let _ = writeln!(
            out,
            "{:<6} {:<10} {:>7} {:>9.3} {:>10.4}  {:>4} {:>4} {:>4}",
            s.symbol,
            format!("{:?}", s.category),
            s.records,
            s.average_magnitude,
            s.average_efficiency,
            s.tiers.best,
            s.tiers.mid,
            s.tiers.low,
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max - 1).collect();
        cut.push('…');
        cut
    }
}
