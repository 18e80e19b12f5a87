//! Property tests for the cart reducer.

use std::collections::HashSet;

use cart_store::persisted::{decode, encode};
use cart_store::{Cart, CartAction, Product};
use proptest::prelude::*;

fn arb_id() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["A", "B", "C", "D", ""]).prop_map(String::from)
}

fn arb_action() -> impl Strategy<Value = CartAction> {
    prop_oneof![
        (arb_id(), -500i32..10_000).prop_map(|(id, cents)| {
            let price = f64::from(cents) / 100.0;
            CartAction::Add(Product::new(id.clone(), format!("title {id}"), "u", price))
        }),
        arb_id().prop_map(CartAction::Increment),
        arb_id().prop_map(CartAction::Decrement),
    ]
}

/// Reference model: (id, quantity) in first-add order.
fn model_apply(model: &mut Vec<(String, u32)>, action: &CartAction) {
    match action {
        CartAction::Add(product) => match model.iter_mut().find(|(id, _)| *id == product.id) {
            Some((_, q)) => *q += 1,
            None => model.push((product.id.clone(), 1)),
        },
        CartAction::Increment(id) => {
            if let Some((_, q)) = model.iter_mut().find(|(i, _)| i == id) {
                *q += 1;
            }
        }
        CartAction::Decrement(id) => {
            if let Some(pos) = model.iter().position(|(i, _)| i == id) {
                model[pos].1 -= 1;
                if model[pos].1 == 0 {
                    model.remove(pos);
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn quantities_stay_positive_and_ids_unique(actions in prop::collection::vec(arb_action(), 0..60)) {
        let mut cart = Cart::new();
        for action in actions {
            cart.apply(action);
            prop_assert!(cart.iter().all(|item| item.quantity >= 1));
            let ids: HashSet<&str> = cart.iter().map(|item| item.id.as_str()).collect();
            prop_assert_eq!(ids.len(), cart.len());
        }
    }

    #[test]
    fn reducer_matches_reference_model(actions in prop::collection::vec(arb_action(), 0..60)) {
        let mut cart = Cart::new();
        let mut model = Vec::new();
        for action in actions {
            model_apply(&mut model, &action);
            cart.apply(action);
        }
        let observed: Vec<(String, u32)> =
            cart.iter().map(|item| (item.id.clone(), item.quantity)).collect();
        prop_assert_eq!(observed, model);
    }

    #[test]
    fn unknown_ids_leave_cart_unchanged(actions in prop::collection::vec(arb_action(), 0..30)) {
        let mut cart = Cart::new();
        for action in actions {
            cart.apply(action);
        }
        prop_assert_eq!(cart.increment("missing"), cart.clone());
        prop_assert_eq!(cart.decrement("missing"), cart.clone());
    }

    #[test]
    fn persisted_cart_reloads_equal(actions in prop::collection::vec(arb_action(), 0..30)) {
        let mut cart = Cart::new();
        for action in actions {
            cart.apply(action);
        }
        let raw = encode(&cart).unwrap();
        prop_assert_eq!(decode(&raw).unwrap(), cart);
    }
}
