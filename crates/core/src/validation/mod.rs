//! Economic context validation (pass 4).

mod economic;

pub use economic::{
    EconomicValidator, LARGE_PAYMENT_REVIEW_THRESHOLD, VENDOR_BOOST_ACTIVE, VENDOR_BOOST_PRICED,
    WIRE_AUTHORIZATION_THRESHOLD,
};
