//! Public identifier generation. Rows keep an internal integer key and a
//! cuid2 `public_id` that is the only identifier exposed over the API.

use cuid2::CuidConstructor;
use once_cell::sync::Lazy;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

pub fn new_public_id() -> String {
    CUID.create_id()
}
