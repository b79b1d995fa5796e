//! Reed-Solomon decoding for erasures that cover whole cells.
//!
//! The received codeword `E` has every missing cell zeroed. With `Z` the
//! vanishing polynomial of the missing points, `E·Z = D·Z` on the whole
//! extended domain, and both sides have degree below its size, so
//! `D = IFFT(E ⊙ Z) / Z`. The division runs on a coset where `Z` has no zeros.
//!
//! Cells are aligned to the structure of the bit-reversed domain: cell `k` is
//! the coset `η_k ⟨ω_ℓ⟩`, whose points all satisfy `X^ℓ = ω_{M/ℓ}^{rev(k)}`.
//! Hence `Z(X) = Z_small(X^ℓ)` where `Z_small` vanishes at `ω_{M/ℓ}^{rev(k)}`
//! for every missing `k`.

mod pool;

use crate::domain::Domain;
use crate::errors::{KzgError, Result};
use crate::poly::polynomial::GeneralDensePolynomial;
use crate::util::{bit_reverse, is_positive_power_of_two, reverse_bits};
use ark_ff::{batch_inversion, FftField};
use pool::ScratchPool;
use tracing::{debug, trace};

#[derive(Debug)]
pub struct BlockErasureDecoder<F: FftField> {
    num_scalars_in_data_word: usize,
    block_erasure_size: usize,
    /// size M, the codeword length
    extended_domain: Domain<F>,
    /// size M/ℓ, one root per cell
    block_domain: Domain<F>,
    scratch: ScratchPool<F>,
}

impl<F: FftField> BlockErasureDecoder<F> {
    pub fn new(
        num_scalars_in_codeword: usize,
        num_scalars_in_data_word: usize,
        block_erasure_size: usize,
    ) -> Result<Self> {
        is_positive_power_of_two("codeword length", num_scalars_in_codeword)?;
        is_positive_power_of_two("data word length", num_scalars_in_data_word)?;
        is_positive_power_of_two("block erasure size", block_erasure_size)?;
        if num_scalars_in_data_word > num_scalars_in_codeword {
            return Err(KzgError::InvalidConfig(format!(
                "data word of {num_scalars_in_data_word} scalars does not fit a codeword of {num_scalars_in_codeword}"
            )));
        }
        if block_erasure_size > num_scalars_in_data_word {
            return Err(KzgError::InvalidConfig(format!(
                "block of {block_erasure_size} scalars exceeds the data word of {num_scalars_in_data_word}"
            )));
        }

        let extended_domain = Domain::new(num_scalars_in_codeword)?;
        let block_domain = Domain::new(num_scalars_in_codeword / block_erasure_size)?;
        debug!(
            num_scalars_in_codeword,
            num_scalars_in_data_word,
            block_erasure_size,
            "built block erasure decoder"
        );

        Ok(BlockErasureDecoder {
            num_scalars_in_data_word,
            block_erasure_size,
            extended_domain,
            block_domain,
            scratch: ScratchPool::new(num_scalars_in_codeword),
        })
    }

    pub fn num_blocks(&self) -> usize {
        self.block_domain.size()
    }

    /// Fewest blocks from which the data word is determined.
    pub fn num_blocks_required(&self) -> usize {
        self.num_scalars_in_data_word / self.block_erasure_size
    }

    fn check_missing(&self, missing_block_indices: &[usize]) -> Result<()> {
        let mut seen = vec![false; self.num_blocks()];
        for &index in missing_block_indices {
            match seen.get_mut(index) {
                None => {
                    return Err(KzgError::InvalidBlockIndex {
                        index,
                        num_blocks: self.num_blocks(),
                    })
                }
                Some(true) => return Err(KzgError::DuplicateBlockIndex(index)),
                Some(flag) => *flag = true,
            }
        }
        let available = self.num_blocks() - missing_block_indices.len();
        if available < self.num_blocks_required() {
            return Err(KzgError::InsufficientBlocks {
                available,
                required: self.num_blocks_required(),
            });
        }
        Ok(())
    }

    /// Recovers the coefficients of the data word.
    ///
    /// `data` is the codeword in cell order (the bit-reversed evaluations,
    /// cells concatenated); entries of missing cells are ignored. The result
    /// is not checked against any commitment.
    pub fn recover(&self, data: &[F], missing_block_indices: &[usize]) -> Result<Vec<F>> {
        if data.len() != self.extended_domain.size() {
            return Err(KzgError::LengthMismatch {
                expected: self.extended_domain.size(),
                got: data.len(),
            });
        }
        self.check_missing(missing_block_indices)?;
        let ell = self.block_erasure_size;
        trace!(missing = missing_block_indices.len(), "recovering data word");

        let mut codeword = self.scratch.checkout();
        codeword.copy_from_slice(data);
        for &k in missing_block_indices {
            codeword[k * ell..(k + 1) * ell].fill(F::ZERO);
        }
        bit_reverse(&mut codeword)?;

        let log_blocks = self.block_domain.log_size();
        let roots: Vec<F> = missing_block_indices
            .iter()
            .map(|&k| self.block_domain.element(reverse_bits(k, log_blocks)))
            .collect();
        let vanishing = GeneralDensePolynomial::<F, F>::vanishing(&roots);

        // Z(X) = Z_small(X^ℓ)
        let mut z_evals = self.scratch.checkout();
        for (i, coeff) in vanishing.coeffs.iter().enumerate() {
            z_evals[i * ell] = *coeff;
        }
        let mut z_coset = self.scratch.checkout();
        z_coset.copy_from_slice(&z_evals);
        self.extended_domain.fft(&mut z_evals)?;
        self.extended_domain.coset_fft(&mut z_coset)?;

        // (E·Z)(X) in coefficient form, then on the coset
        for (e, z) in codeword.iter_mut().zip(z_evals.iter()) {
            *e *= z;
        }
        self.extended_domain.ifft(&mut codeword)?;
        self.extended_domain.coset_fft(&mut codeword)?;

        batch_inversion(&mut z_coset);
        for (e, z_inv) in codeword.iter_mut().zip(z_coset.iter()) {
            *e *= z_inv;
        }
        self.extended_domain.coset_ifft(&mut codeword)?;

        Ok(codeword[..self.num_scalars_in_data_word].to_vec())
    }
}
