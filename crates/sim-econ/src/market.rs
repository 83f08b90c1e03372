//! Cross-company market share allocation.
//!
//! Products built from the same recipe compete with each other in every
//! market their companies sell into. Each market contributes its size,
//! divided among the competitors in proportion to their market scores.

use crate::company::Company;
use crate::product::Product;
use sim_core::Market;
use std::collections::BTreeMap;
use tracing::debug;

/// Score a product competes with: company reach plus its quality axes,
/// marketing weighted highest.
pub fn market_score(company: &Company, product: &Product) -> f32 {
    score_with_reach(reach(company), product)
}

fn reach(company: &Company) -> f32 {
    company.publicity.value() + company.opinion.value()
}

fn score_with_reach(reach: f32, product: &Product) -> f32 {
    let score = reach
        + product.marketing.value()
        + product.design.value() / 2.0
        + product.engineering.value() / 3.0;
    score.max(0.0)
}

/// Recompute `market_score` and `market_share` of every active product.
///
/// Inactive products keep whatever they had; only products of enabled
/// companies take part.
pub fn calculate_market_shares(companies: &mut [Company]) {
    for company in companies.iter_mut() {
        if company.disabled {
            continue;
        }
        let company_reach = reach(company);
        for p in company.products.iter_mut().filter(|p| p.is_active()) {
            p.market_score = score_with_reach(company_reach, p);
            p.market_share = 0.0;
        }
    }

    for market in Market::ALL {
        // Total score per recipe among companies selling into this market.
        let mut totals: BTreeMap<String, f32> = BTreeMap::new();
        for company in companies.iter() {
            if company.disabled || !company.markets.contains(&market) {
                continue;
            }
            for p in company.products.iter().filter(|p| p.is_active()) {
                *totals.entry(p.recipe_id().to_string()).or_insert(0.0) += p.market_score;
            }
        }
        if totals.is_empty() {
            continue;
        }

        let size = market.size();
        for company in companies.iter_mut() {
            if company.disabled || !company.markets.contains(&market) {
                continue;
            }
            for p in company.products.iter_mut().filter(|p| p.is_active()) {
                match totals.get(p.recipe_id()) {
                    Some(total) if *total > 0.0 => {
                        p.market_share += p.market_score / total * size;
                    }
                    _ => {}
                }
            }
        }
        debug!(?market, recipes = totals.len(), "market shares allocated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductId;
    use crate::recipe::ProductRecipe;
    use proptest::prelude::*;
    use sim_core::ProductType;
    use std::sync::Arc;

    fn company_with(name: &str, market: Market, marketing: f32) -> Company {
        let mut c = Company::new(name, 0.0);
        c.markets = [market].into_iter().collect();
        let recipe = Arc::new(ProductRecipe {
            id: "Gadget".to_string(),
            ..ProductRecipe::fallback()
        });
        let mut p = Product::new(
            ProductId(0),
            format!("{name} product"),
            vec![ProductType::new("Gadget")],
            recipe,
            1.0,
        );
        p.marketing.base_value = marketing;
        p.launch();
        c.products.push(p);
        c
    }

    #[test]
    fn shares_are_proportional_to_score() {
        let mut companies = vec![
            company_with("A", Market::Asia, 3.0),
            company_with("B", Market::Asia, 1.0),
            company_with("C", Market::Europe, 1.0),
        ];
        calculate_market_shares(&mut companies);
        assert_eq!(companies[0].products[0].market_share(), 1.5);
        assert_eq!(companies[1].products[0].market_share(), 0.5);
        // C is alone in Europe and gets nothing from Asia.
        assert_eq!(companies[2].products[0].market_share(), Market::Europe.size());
    }

    #[test]
    fn zero_total_allocates_nothing() {
        let mut companies = vec![company_with("A", Market::Asia, 0.0)];
        calculate_market_shares(&mut companies);
        assert_eq!(companies[0].products[0].market_share(), 0.0);
        assert_eq!(companies[0].products[0].market_score(), 0.0);
    }

    #[test]
    fn disabled_companies_do_not_compete() {
        let mut companies = vec![
            company_with("A", Market::Asia, 3.0),
            company_with("B", Market::Asia, 1.0),
        ];
        companies[1].disabled = true;
        calculate_market_shares(&mut companies);
        assert_eq!(companies[0].products[0].market_share(), 2.0);
        assert_eq!(companies[1].products[0].market_share(), 0.0);
    }

    #[test]
    fn score_matches_formula() {
        let mut c = company_with("A", Market::Asia, 4.0);
        c.publicity.base_value = 1.0;
        c.opinion.base_value = 2.0;
        c.products[0].design.base_value = 6.0;
        c.products[0].engineering.base_value = 9.0;
        assert_eq!(market_score(&c, &c.products[0]), 1.0 + 2.0 + 4.0 + 3.0 + 3.0);
    }

    proptest! {
        #[test]
        fn shares_sum_to_market_size(scores in prop::collection::vec(0.1f32..100.0, 1..8)) {
            let mut companies: Vec<Company> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| company_with(&format!("C{i}"), Market::Africa, *s))
                .collect();
            calculate_market_shares(&mut companies);
            let total: f32 = companies.iter().map(|c| c.products[0].market_share()).sum();
            prop_assert!((total - Market::Africa.size()).abs() < 1e-3);
        }
    }
}
