//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use msgroute_rs::RoutingEngine;

/// Assert that the maintained tables agree with a fresh rebuild
pub fn assert_consistent(engine: &RoutingEngine) {
    if engine.is_consistent() {
        return;
    }
    let mut rebuilt = engine.clone();
    rebuilt.rebuild();
    panic!(
        "Maintained tables drifted from a rebuild:\nmaintained: {:#?}\nrebuilt: {:#?}",
        engine.tables(),
        rebuilt.tables()
    );
}
