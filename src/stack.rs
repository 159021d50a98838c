//! Stack headroom for the recursive passes.
//!
//! The parser, resolver and evaluator all recurse once per level of syntactic
//! nesting, and the evaluator once more per Lox call. Each of them enters
//! through [`ensure_sufficient_stack`], which moves onto a freshly allocated
//! segment whenever the current one runs low.

/// Space that must remain on the current segment before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
