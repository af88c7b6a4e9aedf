// Cross-model properties checked through the public solve entry point

use approx::{assert_abs_diff_eq, assert_relative_eq};
use auctions::{bid_factor, compare_formats, equilibrium_bid, AuctionFormat, AuctionParams};
use econ_lab::{solve, welfare, EquilibriumResult, Model, ParameterSet};
use market_structure::{LinearDemand, MarketParams, StackelbergParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn market(rng: &mut StdRng) -> MarketParams {
    let intercept = rng.random_range(20.0..200.0);
    MarketParams {
        demand: LinearDemand {
            intercept,
            slope: rng.random_range(0.25..4.0),
        },
        marginal_cost: rng.random_range(0.0..0.9 * intercept),
        num_firms: 1,
    }
}

fn solve_market(model: Model, params: MarketParams) -> EquilibriumResult {
    let set = match model {
        Model::PerfectCompetition => ParameterSet::PerfectCompetition(params),
        Model::Monopoly => ParameterSet::Monopoly(params),
        Model::Cournot => ParameterSet::Cournot(params),
        Model::Bertrand => ParameterSet::Bertrand(params),
        other => panic!("{} is not a symmetric market model", other),
    };
    solve(model, &set).unwrap()
}

#[test]
fn cournot_with_one_firm_is_monopoly() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let params = market(&mut rng);
        let cournot = solve_market(Model::Cournot, params);
        let monopoly = solve_market(Model::Monopoly, params);
        assert_relative_eq!(
            cournot.output("market_quantity").unwrap(),
            monopoly.output("market_quantity").unwrap(),
            max_relative = 1e-12
        );
    }
}

#[test]
fn cournot_price_approaches_marginal_cost() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let params = market(&mut rng);
        let mut gap = f64::INFINITY;
        for n in [1, 2, 5, 10, 100, 10_000] {
            let price = solve_market(Model::Cournot, MarketParams { num_firms: n, ..params })
                .output("price")
                .unwrap();
            let next = price - params.marginal_cost;
            assert!(next < gap, "n = {}: gap {} did not shrink from {}", n, next, gap);
            gap = next;
        }
        let margin = params.demand.intercept - params.marginal_cost;
        assert!(gap < 1e-3 * margin);
    }
}

#[test]
fn stackelberg_leader_outproduces_cournot_firm_outproduces_follower() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let base = market(&mut rng);
        let cournot = solve_market(Model::Cournot, MarketParams { num_firms: 2, ..base });
        let stackelberg = StackelbergParams {
            demand: base.demand,
            costs: [base.marginal_cost; 2],
            ..StackelbergParams::default()
        };
        let result = solve(Model::Stackelberg, &ParameterSet::Stackelberg(stackelberg)).unwrap();

        let per_firm = cournot.output("quantity_per_firm").unwrap();
        let leader = result.output("leader_quantity").unwrap();
        let follower = result.output("follower_quantity").unwrap();
        assert!(leader >= per_firm && per_firm >= follower);
    }
}

#[test]
fn auction_formats_are_revenue_equivalent() {
    for num_bidders in [2, 3, 4, 7, 12] {
        for reserve_price in [0.0, 0.25, 0.5] {
            let params = AuctionParams {
                num_bidders,
                reserve_price,
                ..AuctionParams::default()
            };
            let revenues = compare_formats(&params).unwrap();
            let first = revenues[0].revenue;
            for r in &revenues {
                assert_relative_eq!(r.revenue, first, max_relative = 1e-6);
            }
        }
    }
}

#[test]
fn second_price_and_english_bid_truthfully() {
    for format in [AuctionFormat::SecondPrice, AuctionFormat::English] {
        let params = AuctionParams {
            format,
            ..AuctionParams::default()
        };
        assert_eq!(bid_factor(format, params.num_bidders), 1.0);
        for value in [0.0, 0.1, 0.37, 0.9, 1.0] {
            assert_eq!(equilibrium_bid(&params, value).unwrap(), Some(value));
        }
    }
}

#[test]
fn welfare_falls_from_competition_to_cournot_to_monopoly() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..100 {
        let params = market(&mut rng);
        let n = rng.random_range(2..20);
        let competitive = welfare(&solve_market(Model::PerfectCompetition, params));
        let cournot = welfare(&solve_market(Model::Cournot, MarketParams { num_firms: n, ..params }));
        let monopoly = welfare(&solve_market(Model::Monopoly, params));

        assert!(competitive.total_surplus >= cournot.total_surplus);
        assert!(cournot.total_surplus >= monopoly.total_surplus);
        assert!(monopoly.deadweight_loss > 0.0);
        assert_abs_diff_eq!(competitive.deadweight_loss, 0.0, epsilon = 1e-9);
    }
}

// Deadweight loss is the full triangle ½·(P − c)·(Q_c − Q_m) = ½·40·40
#[test]
fn classroom_monopoly() {
    let result = solve(Model::Monopoly, &ParameterSet::preset(Model::Monopoly)).unwrap();
    assert_abs_diff_eq!(result.output("market_quantity").unwrap(), 40.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.output("price").unwrap(), 60.0, epsilon = 1e-9);
    assert_abs_diff_eq!(welfare(&result).deadweight_loss, 800.0, epsilon = 1e-9);
}

#[test]
fn classroom_cournot_duopoly() {
    let result = solve(Model::Cournot, &ParameterSet::preset(Model::Cournot)).unwrap();
    let round = |x: f64| (x * 100.0).round() / 100.0;
    assert_eq!(round(result.output("quantity_per_firm").unwrap()), 26.67);
    assert_eq!(round(result.output("market_quantity").unwrap()), 53.33);
    assert_eq!(round(result.output("price").unwrap()), 46.67);
}

#[test]
fn four_bidder_first_price_shades_by_a_quarter() {
    let result = solve(Model::Auction, &ParameterSet::preset(Model::Auction)).unwrap();
    assert_abs_diff_eq!(result.output("bid_factor").unwrap(), 0.75, epsilon = 1e-12);
    let bid = equilibrium_bid(&AuctionParams::default(), 0.8).unwrap().unwrap();
    assert_abs_diff_eq!(bid, 0.6, epsilon = 1e-12);
}

#[test]
fn cost_above_intercept_is_rejected_by_every_market_solver() {
    let cases = [
        (Model::PerfectCompetition, "marginal_cost", 150.0),
        (Model::Monopoly, "marginal_cost", 150.0),
        (Model::Cournot, "marginal_cost", 150.0),
        (Model::Bertrand, "marginal_cost", 150.0),
        (Model::CournotDuopoly, "costs.0", 150.0),
        (Model::Stackelberg, "costs.1", 150.0),
        (Model::DifferentiatedBertrand, "marginal_costs.0", 150.0),
        (Model::MonopolisticCompetition, "marginal_cost", 150.0),
    ];
    for (model, path, cost) in cases {
        let params = ParameterSet::preset(model).with_parameter(path, cost).unwrap();
        let err = solve(model, &params).unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter", "{}", model);
    }
}

#[test]
fn solving_twice_is_bit_identical() {
    for model in Model::ALL {
        let params = ParameterSet::preset(model);
        let first = solve(model, &params).unwrap();
        let second = solve(model, &params).unwrap();
        assert_eq!(first, second, "{}", model);
        let bits = |r: &EquilibriumResult| r.outputs().iter().map(|(_, v)| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second), "{}", model);
    }
}

#[test]
fn market_comparison_lines_up_the_regimes() {
    let result = solve(Model::MarketComparison, &ParameterSet::preset(Model::MarketComparison)).unwrap();
    assert_abs_diff_eq!(result.output("price_competition").unwrap(), 20.0, epsilon = 1e-12);
    assert_abs_diff_eq!(result.output("price_cournot").unwrap(), 40.0, epsilon = 1e-12);
    assert_abs_diff_eq!(result.output("price_monopoly").unwrap(), 60.0, epsilon = 1e-12);
    assert!(result.output("total_surplus_cournot").unwrap() > result.output("total_surplus_monopoly").unwrap());
}

#[test]
fn optimal_reserve_matches_the_uniform_rule() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let high = rng.random_range(1.0..50.0);
        let seller_value = rng.random_range(0.0..0.9 * high);
        let params = auctions::ReserveParams {
            num_bidders: rng.random_range(2..8),
            distribution: auctions::ValuationDistribution::Uniform { low: 0.0, high },
            seller_value,
            ..auctions::ReserveParams::default()
        };
        let result = solve(Model::OptimalReserve, &ParameterSet::OptimalReserve(params)).unwrap();
        assert_relative_eq!(result.output("reserve_price").unwrap(), (high + seller_value) / 2.0, max_relative = 1e-12);
        assert!(result.output("payoff_gain").unwrap() >= 0.0);
        assert!(welfare(&result).is_consistent());
    }
}
