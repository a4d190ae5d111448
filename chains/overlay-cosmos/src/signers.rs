use std::fmt::{Debug, Formatter};

use bech32::ToBase32;
use cosmrs::bip32::{DerivationPath, Language, Mnemonic, XPrv};
use cosmrs::crypto::secp256k1::SigningKey;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::CosmosClientError;

/// Fixed HD path prefix; identities differ only by the trailing index.
const HD_PATH_PREFIX: &str = "m/44'/118'/0'/0";

/// A single derived signing identity.
#[derive(Clone)]
pub struct Signer {
    /// The bech32 human-readable prefix.
    pub prefix: String,
    /// The bech32 account address.
    pub address: String,
    private_key: Vec<u8>,
}

impl Debug for Signer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // intentionally leaves out the private key
        f.debug_struct("Signer")
            .field("prefix", &self.prefix)
            .field("address", &self.address)
            .finish()
    }
}

impl Signer {
    /// Derive the identity at `index` under the fixed HD path.
    pub fn from_mnemonic(
        phrase: &str,
        prefix: &str,
        index: u32,
    ) -> Result<Self, CosmosClientError> {
        let mnemonic = Mnemonic::new(phrase.trim(), Language::English)?;
        let seed = mnemonic.to_seed("");
        let path: DerivationPath = format!("{HD_PATH_PREFIX}/{index}").parse()?;
        let derived = XPrv::derive_from_path(seed.as_bytes(), &path)?;
        let private_key = derived.private_key().to_bytes().to_vec();

        let public_key = SigningKey::from_slice(&private_key)?.public_key();
        let address = pub_to_addr(&public_key.to_bytes(), prefix)?;

        Ok(Self {
            prefix: prefix.to_string(),
            address,
            private_key,
        })
    }

    /// Rebuild the signing key from the stored bytes.
    pub fn signing_key(&self) -> Result<SigningKey, CosmosClientError> {
        Ok(SigningKey::from_slice(&self.private_key)?)
    }
}

/// The full set of derived identities, constructed once at startup and held
/// immutably.
#[derive(Clone, Debug)]
pub struct SignerSet {
    signers: Vec<Signer>,
}

impl SignerSet {
    /// Derive `count` identities from the mnemonic, indices `0..count`.
    pub fn derive(phrase: &str, prefix: &str, count: usize) -> Result<Self, CosmosClientError> {
        let signers = (0..count as u32)
            .map(|index| Signer::from_mnemonic(phrase, prefix, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { signers })
    }

    /// The identity at `index`.
    pub fn get(&self, index: usize) -> Option<&Signer> {
        self.signers.get(index)
    }

    /// Number of identities in the set.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    /// Iterate over the identities in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Signer> {
        self.signers.iter()
    }
}

/// Form a bech32 account address from a compressed secp256k1 public key.
pub fn pub_to_addr(pub_key: &[u8], prefix: &str) -> Result<String, CosmosClientError> {
    let sha_hash = Sha256::digest(pub_key);
    let rip_hash = Ripemd160::digest(sha_hash);

    Ok(bech32::encode(
        prefix,
        rip_hash.to_base32(),
        bech32::Variant::Bech32,
    )?)
}

#[cfg(test)]
mod test {
    use super::*;

    // standard BIP-39 test vector phrase; carries no funds anywhere
    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon abandon abandon abandon \
                          abandon abandon abandon abandon abandon abandon abandon art";

    #[test]
    fn derivation_is_deterministic() {
        let a = Signer::from_mnemonic(PHRASE, "seda", 0).unwrap();
        let b = Signer::from_mnemonic(PHRASE, "seda", 0).unwrap();
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn indices_produce_distinct_addresses() {
        let set = SignerSet::derive(PHRASE, "seda", 3).unwrap();
        assert_eq!(set.len(), 3);
        let addrs: Vec<_> = set.iter().map(|s| s.address.clone()).collect();
        assert_ne!(addrs[0], addrs[1]);
        assert_ne!(addrs[1], addrs[2]);
    }

    #[test]
    fn addresses_carry_the_configured_prefix() {
        let signer = Signer::from_mnemonic(PHRASE, "seda", 0).unwrap();
        assert!(signer.address.starts_with("seda1"));
    }

    #[test]
    fn rejects_invalid_mnemonics() {
        assert!(Signer::from_mnemonic("definitely not a mnemonic", "seda", 0).is_err());
    }
}
