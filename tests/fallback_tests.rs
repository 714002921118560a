// Host-side tests for the ordered fallback combinators.

use std::cell::Cell;
use wellaver_core::*;

#[test]
fn first_success_wins_and_stops_the_chain() {
    let tried = Cell::new(0);
    let result = pollster::block_on(first_ok(["a", "b", "c"], |c| {
        tried.set(tried.get() + 1);
        async move {
            if c == "b" {
                Ok(c.to_uppercase())
            } else {
                Err(format!("{c} unavailable"))
            }
        }
    }));
    assert_eq!(result.expect("b succeeds"), (1, "B".to_string()));
    assert_eq!(tried.get(), 2);
}

#[test]
fn all_failures_are_reported_in_order() {
    let err = pollster::block_on(first_ok([1, 2, 3], |n| async move {
        Err::<(), _>(format!("no {n}"))
    }))
    .expect_err("every candidate fails");
    assert_eq!(err.errors, vec!["no 1", "no 2", "no 3"]);
    let msg = err.to_string();
    assert!(msg.starts_with("all 3 candidates failed"));
    assert!(msg.contains("#2: no 3"));
}

#[test]
fn empty_chain_is_an_error() {
    let err = first_ok_sync(Vec::<u8>::new(), |_| Ok::<_, String>(()))
        .expect_err("nothing to try");
    assert!(err.errors.is_empty());
    assert_eq!(err.to_string(), "no candidates to try");
}

#[test]
fn blocking_variant_matches() {
    let chain = vec![
        EnvironmentSource::Equirect("missing.hdr".into()),
        EnvironmentSource::Solid([0.1, 0.1, 0.1]),
    ];
    let (i, env) = first_ok_sync(chain, |s| match s {
        EnvironmentSource::Solid(rgb) => Ok(EnvironmentMap::solid(rgb)),
        EnvironmentSource::Equirect(url) => Err(format!("404 {url}")),
    })
    .expect("solid color always loads");
    assert_eq!(i, 1);
    assert_eq!(env.texels, vec![[0.1, 0.1, 0.1]]);
}
