//! # Help Text
//!
//! Sent in direct conversations when a message is not an invocation.

pub fn main(prefix: &str) -> String {
    format!(
        concat!(
            "__Introducing... **ArrayButt!**__\n",
            "A revolution in philosophy!\n",
            "Invoke me with `{} [date|query]`"
        ),
        prefix
    )
}
