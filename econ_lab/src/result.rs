//! Tagged equilibrium results and their named outputs

use auctions::{AuctionOutcome, ReserveOutcome};
use differentiation::{HotellingOutcome, SalopOutcome, VerticalOutcome};
use econ_core::WelfareMetrics;
use game_theory::{GameAnalysis, GrimTrigger, InvestmentDecision, MatchRecord};
use market_structure::{
    BertrandOutcome, DuopolyOutcome, EntryOutcome, MarketComparison, MarketOutcome, Regime,
    StackelbergOutcome,
};
use network_effects::{AdoptionOutcome, CompetitionOutcome, PlatformOutcome};
use serde::{Deserialize, Serialize};

use crate::model::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum EquilibriumResult {
    PerfectCompetition(MarketOutcome),
    Monopoly(MarketOutcome),
    Cournot(MarketOutcome),
    Bertrand(MarketOutcome),
    MarketComparison(MarketComparison),
    CournotDuopoly(DuopolyOutcome),
    Stackelberg(StackelbergOutcome),
    DifferentiatedBertrand(BertrandOutcome),
    MonopolisticCompetition(EntryOutcome),
    NormalFormGame(GameAnalysis),
    EntryGame(GameAnalysis),
    GrimTrigger(GrimTrigger),
    StrategyMatch(MatchRecord),
    Investment(InvestmentDecision),
    Hotelling(HotellingOutcome),
    Salop(SalopOutcome),
    VerticalDifferentiation(VerticalOutcome),
    Auction(AuctionOutcome),
    OptimalReserve(ReserveOutcome),
    NetworkAdoption(AdoptionOutcome),
    PlatformCompetition(CompetitionOutcome),
    TwoSidedPlatform(PlatformOutcome),
}

/// Ordered (name, value) pairs
#[derive(Debug, Default)]
struct Outputs(Vec<(String, f64)>);

impl Outputs {
    fn add(&mut self, name: &str, value: f64) -> &mut Self {
        self.0.push((name.to_string(), value));
        self
    }

    fn add_indexed(&mut self, name: &str, values: &[f64]) -> &mut Self {
        for (i, v) in values.iter().enumerate() {
            self.0.push((format!("{}_{}", name, i + 1), *v));
        }
        self
    }

    fn add_flag(&mut self, name: &str, flag: bool) -> &mut Self {
        self.add(name, if flag { 1.0 } else { 0.0 })
    }

    fn add_optional(&mut self, name: &str, value: Option<f64>) -> &mut Self {
        if let Some(v) = value {
            self.add(name, v);
        }
        self
    }
}

fn market(out: &mut Outputs, m: &MarketOutcome) {
    out.add("price", m.price)
        .add("quantity_per_firm", m.quantity_per_firm)
        .add("market_quantity", m.market_quantity)
        .add("profit_per_firm", m.profit_per_firm)
        .add("num_firms", m.num_firms as f64)
        .add("lerner_index", m.lerner_index());
}

fn regime_key(m: &MarketOutcome) -> &'static str {
    match m.regime {
        Regime::PerfectCompetition => "competition",
        Regime::Bertrand => "bertrand",
        Regime::Cournot => "cournot",
        Regime::Monopoly => "monopoly",
    }
}

fn game(out: &mut Outputs, g: &GameAnalysis) {
    out.add("equilibria", g.equilibria.len() as f64)
        .add_optional("row_dominant", g.row_dominant.as_ref().map(|d| d.index as f64))
        .add_optional("column_dominant", g.column_dominant.as_ref().map(|d| d.index as f64));
    if let Some(top) = g.equilibria.first() {
        out.add("equilibrium_row", top.row as f64)
            .add("equilibrium_column", top.column as f64)
            .add("equilibrium_row_payoff", top.row_payoff)
            .add("equilibrium_column_payoff", top.column_payoff);
    }
    out.add("max_payoff_sum", g.max_payoff_sum);
}

impl EquilibriumResult {
    pub fn model(&self) -> Model {
        match self {
            EquilibriumResult::PerfectCompetition(_) => Model::PerfectCompetition,
            EquilibriumResult::Monopoly(_) => Model::Monopoly,
            EquilibriumResult::Cournot(_) => Model::Cournot,
            EquilibriumResult::Bertrand(_) => Model::Bertrand,
            EquilibriumResult::MarketComparison(_) => Model::MarketComparison,
            EquilibriumResult::CournotDuopoly(_) => Model::CournotDuopoly,
            EquilibriumResult::Stackelberg(_) => Model::Stackelberg,
            EquilibriumResult::DifferentiatedBertrand(_) => Model::DifferentiatedBertrand,
            EquilibriumResult::MonopolisticCompetition(_) => Model::MonopolisticCompetition,
            EquilibriumResult::NormalFormGame(_) => Model::NormalFormGame,
            EquilibriumResult::EntryGame(_) => Model::EntryGame,
            EquilibriumResult::GrimTrigger(_) => Model::GrimTrigger,
            EquilibriumResult::StrategyMatch(_) => Model::StrategyMatch,
            EquilibriumResult::Investment(_) => Model::Investment,
            EquilibriumResult::Hotelling(_) => Model::Hotelling,
            EquilibriumResult::Salop(_) => Model::Salop,
            EquilibriumResult::VerticalDifferentiation(_) => Model::VerticalDifferentiation,
            EquilibriumResult::Auction(_) => Model::Auction,
            EquilibriumResult::OptimalReserve(_) => Model::OptimalReserve,
            EquilibriumResult::NetworkAdoption(_) => Model::NetworkAdoption,
            EquilibriumResult::PlatformCompetition(_) => Model::PlatformCompetition,
            EquilibriumResult::TwoSidedPlatform(_) => Model::TwoSidedPlatform,
        }
    }

    /// Named real outputs in a stable order, for tables and CSV export
    pub fn outputs(&self) -> Vec<(String, f64)> {
        let mut out = Outputs::default();
        match self {
            EquilibriumResult::PerfectCompetition(m)
            | EquilibriumResult::Monopoly(m)
            | EquilibriumResult::Cournot(m)
            | EquilibriumResult::Bertrand(m) => market(&mut out, m),
            EquilibriumResult::MarketComparison(c) => {
                for m in c.regimes() {
                    let key = |name: &str| format!("{}_{}", name, regime_key(m));
                    out.add(&key("price"), m.price)
                        .add(&key("market_quantity"), m.market_quantity)
                        .add(&key("total_profit"), m.total_profit())
                        .add(&key("total_surplus"), m.welfare().total_surplus);
                }
            }
            EquilibriumResult::CournotDuopoly(d) => {
                out.add_indexed("quantity", &d.quantities)
                    .add("market_quantity", d.market_quantity())
                    .add("price", d.price)
                    .add_indexed("profit", &d.profits);
            }
            EquilibriumResult::Stackelberg(s) => {
                out.add("leader_quantity", s.leader_quantity)
                    .add("follower_quantity", s.follower_quantity)
                    .add("market_quantity", s.market_quantity())
                    .add("price", s.price)
                    .add("leader_profit", s.leader_profit)
                    .add("follower_profit", s.follower_profit);
            }
            EquilibriumResult::DifferentiatedBertrand(b) => {
                out.add_indexed("price", &b.prices)
                    .add_indexed("quantity", &b.quantities)
                    .add_indexed("profit", &b.profits)
                    .add("average_price", b.average_price())
                    .add("total_quantity", b.total_quantity());
            }
            EquilibriumResult::MonopolisticCompetition(e) => {
                out.add("num_firms", e.num_firms as f64)
                    .add("zero_profit_firms", e.zero_profit_firms)
                    .add("price", e.price)
                    .add("quantity_per_firm", e.quantity_per_firm)
                    .add("market_quantity", e.market_quantity)
                    .add("markup", e.markup)
                    .add("profit_per_firm", e.profit_per_firm);
            }
            EquilibriumResult::NormalFormGame(g) | EquilibriumResult::EntryGame(g) => game(&mut out, g),
            EquilibriumResult::GrimTrigger(g) => {
                out.add("cooperation_value", g.cooperation_value)
                    .add("defection_value", g.defection_value)
                    .add("punishment_value", g.punishment_value)
                    .add("threshold_discount", g.threshold_discount)
                    .add_flag("sustainable", g.sustainable);
            }
            EquilibriumResult::StrategyMatch(m) => {
                out.add("rounds", m.history_a.len() as f64)
                    .add("total_a", m.total_a)
                    .add("total_b", m.total_b)
                    .add("cooperation_rate_a", m.cooperation_rate_a())
                    .add("cooperation_rate_b", m.cooperation_rate_b());
            }
            EquilibriumResult::Investment(i) => {
                out.add("expected_invest_payoff", i.expected_invest_payoff)
                    .add("no_invest_payoff", i.no_invest_payoff)
                    .add_flag("invest", i.invest);
            }
            EquilibriumResult::Hotelling(h) => {
                out.add_indexed("price", &h.prices)
                    .add("indifferent_consumer", h.indifferent_consumer)
                    .add_indexed("demand", &h.demands)
                    .add_indexed("market_share", &h.market_shares)
                    .add_indexed("profit", &h.profits)
                    .add("total_transport_cost", h.total_transport_cost);
            }
            EquilibriumResult::Salop(s) => {
                out.add("num_firms", s.num_firms as f64)
                    .add_optional("zero_profit_firms", s.zero_profit_firms)
                    .add("price", s.price)
                    .add("demand_per_firm", s.demand_per_firm)
                    .add("profit_per_firm", s.profit_per_firm)
                    .add("total_transport_cost", s.total_transport_cost)
                    .add_optional("optimal_firms", s.optimal_firms.map(|n| n as f64));
            }
            EquilibriumResult::VerticalDifferentiation(v) => {
                out.add("price_high", v.price_high)
                    .add("price_low", v.price_low)
                    .add("high_cutoff", v.high_cutoff)
                    .add("low_cutoff", v.low_cutoff)
                    .add("demand_high", v.demand_high)
                    .add("demand_low", v.demand_low)
                    .add("profit_high", v.profit_high)
                    .add("profit_low", v.profit_low);
            }
            EquilibriumResult::Auction(a) => {
                out.add("bid_factor", a.bid_factor)
                    .add("expected_revenue", a.expected.revenue)
                    .add("sale_probability", a.expected.sale_probability)
                    .add("expected_winner_value", a.expected.expected_winner_value);
                if let Some(r) = &a.realized {
                    out.add_optional("winner", r.winner.map(|w| w as f64))
                        .add("payment", r.payment)
                        .add("winner_surplus", r.winner_surplus)
                        .add_flag("efficient", r.efficient);
                }
            }
            EquilibriumResult::OptimalReserve(r) => {
                out.add("reserve_price", r.reserve_price)
                    .add("expected_revenue", r.with_reserve.revenue)
                    .add("sale_probability", r.with_reserve.sale_probability)
                    .add("seller_payoff", r.seller_payoff)
                    .add("baseline_payoff", r.baseline_payoff)
                    .add("payoff_gain", r.payoff_gain());
            }
            EquilibriumResult::NetworkAdoption(n) => {
                out.add("fixed_points", n.fixed_points.len() as f64)
                    .add_optional("critical_mass", n.critical_mass)
                    .add("equilibrium_fraction", n.equilibrium_fraction)
                    .add("iterations", n.iterations as f64)
                    .add_optional("periods_to_majority", n.periods_to_majority.map(|t| t as f64))
                    .add("optimal_fraction", n.optimal_fraction);
            }
            EquilibriumResult::PlatformCompetition(c) => {
                out.add_indexed("market_share", &c.market_shares)
                    .add_indexed("utility", &c.utilities)
                    .add_optional("tipping_share", c.tipping_share)
                    .add_optional("winner", c.winner.map(|w| w as f64));
            }
            EquilibriumResult::TwoSidedPlatform(p) => {
                out.add("price_a", p.prices[0])
                    .add("price_b", p.prices[1])
                    .add("participation_a", p.participation[0])
                    .add("participation_b", p.participation[1])
                    .add("profit", p.profit)
                    .add("subsidy_gap", p.subsidy_gap);
            }
        }
        out.0
    }

    /// Look up one named output
    pub fn output(&self, name: &str) -> Option<f64> {
        self.outputs().into_iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn welfare(&self) -> WelfareMetrics {
        match self {
            EquilibriumResult::PerfectCompetition(m)
            | EquilibriumResult::Monopoly(m)
            | EquilibriumResult::Cournot(m)
            | EquilibriumResult::Bertrand(m) => m.welfare(),
            EquilibriumResult::MarketComparison(c) => c.welfare(),
            EquilibriumResult::CournotDuopoly(d) => d.welfare(),
            EquilibriumResult::Stackelberg(s) => s.welfare(),
            EquilibriumResult::DifferentiatedBertrand(b) => b.welfare(),
            EquilibriumResult::MonopolisticCompetition(e) => e.welfare(),
            EquilibriumResult::NormalFormGame(g) | EquilibriumResult::EntryGame(g) => g.welfare(),
            EquilibriumResult::GrimTrigger(g) => g.welfare(),
            EquilibriumResult::StrategyMatch(m) => m.welfare(),
            EquilibriumResult::Investment(i) => i.welfare(),
            EquilibriumResult::Hotelling(h) => h.welfare(),
            EquilibriumResult::Salop(s) => s.welfare(),
            EquilibriumResult::VerticalDifferentiation(v) => v.welfare(),
            EquilibriumResult::Auction(a) => a.welfare(),
            EquilibriumResult::OptimalReserve(r) => r.welfare(),
            EquilibriumResult::NetworkAdoption(n) => n.welfare(),
            EquilibriumResult::PlatformCompetition(c) => c.welfare(),
            EquilibriumResult::TwoSidedPlatform(p) => p.welfare(),
        }
    }
}
