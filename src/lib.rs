//! Mine phrases from large corpora
//!
//! Bigrams are counted approximately with lossy counting, so memory depends on the error bound
//! instead of the corpus, and then scored by pointwise mutual information against exact unigram
//! counts. The binaries wrap this for extracted wiki dumps on stdin; the library doesn't do any
//! I/O besides what you hand it.


#[macro_use] extern crate log;
extern crate nom;
extern crate farmhash;
extern crate rayon;
extern crate regex;
extern crate unicode_segmentation;
#[cfg(test)] extern crate rand;
pub mod errors;
pub mod farm;
pub mod tokens;
pub mod unigram;
pub mod lossy;
pub mod pmi;
pub mod extracted;
pub mod titles;
pub mod sink;
pub mod pipeline;
