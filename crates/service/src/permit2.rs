//! Permit2 workflow
//!
//! Signs the EIP-712 typed-data bundle an aggregator attaches to a Permit2
//! quote and splices the signature into the transaction payload using the
//! upstream's length-prefixed calldata convention.

use alloy::dyn_abi::TypedData;
use alloy::hex;
use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use omniswap_types::{Permit2Data, Secret, SwapQuote, TypedDataBundle};

#[derive(Error, Debug)]
pub enum Permit2Error {
	#[error("quote carries no permit2 data")]
	MissingPermit2,

	#[error("invalid signing secret")]
	InvalidSigner,

	#[error("typed data rejected: {reason}")]
	InvalidTypedData { reason: String },

	#[error("signing failed: {reason}")]
	SigningFailed { reason: String },

	#[error("invalid hex in {field}")]
	InvalidHex { field: String },
}

/// Result of signing and splicing a Permit2 quote
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit2Execution {
	pub original_tx_data: String,
	pub signature: String,
	pub modified_tx_data: String,
	pub permit2_data: Permit2Data,
}

/// Informational extract of a Permit2 block for logging
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit2Info {
	#[serde(rename = "type")]
	pub kind: String,
	pub hash: String,
	pub primary_type: String,
	pub domain: serde_json::Value,
	pub message_keys: Vec<String>,
}

/// Stateless Permit2 signing and splicing operations.
///
/// The signing secret is a per-request transient; nothing here logs or
/// stores it.
pub struct Permit2Signer;

impl Permit2Signer {
	/// Produce an EIP-712 signature over the bundle.
	///
	/// `types` and `domain` pass through to the signer untouched. Bundles
	/// sourced from upstream aggregators sometimes include an
	/// `EIP712Domain` entry inside `types`; the resolver tolerates it.
	pub async fn sign(
		chain_id: u64,
		secret: &Secret,
		bundle: &TypedDataBundle,
	) -> Result<String, Permit2Error> {
		let typed: TypedData = serde_json::from_value(json!({
			"types": bundle.types,
			"domain": bundle.domain,
			"primaryType": bundle.primary_type,
			"message": bundle.message,
		}))
		.map_err(|e| Permit2Error::InvalidTypedData {
			reason: e.to_string(),
		})?;

		if let Some(domain_chain) = typed.domain.chain_id {
			if domain_chain != U256::from(chain_id) {
				warn!(
					request_chain = chain_id,
					domain_chain = %domain_chain,
					"permit2 domain chainId differs from request chain"
				);
			}
		}

		let signer: PrivateKeySigner = secret
			.expose()
			.parse()
			.map_err(|_| Permit2Error::InvalidSigner)?;

		let signature = signer
			.sign_dynamic_typed_data(&typed)
			.await
			.map_err(|e| Permit2Error::SigningFailed {
				reason: e.to_string(),
			})?;

		debug!(
			primary_type = %bundle.primary_type,
			signer = %signer.address(),
			"permit2 typed data signed"
		);

		Ok(format!("0x{}", hex::encode(signature.as_bytes())))
	}

	/// Append the signature to the calldata with a 32-byte big-endian length
	/// prefix: `original || uint256_be(len(signature)) || signature`.
	///
	/// The layout is the aggregator's v2 calldata convention and must stay
	/// byte-exact.
	pub fn splice_signature(original_data: &str, signature: &str) -> Result<String, Permit2Error> {
		let data = decode_hex_field(original_data, "data")?;
		let sig = decode_hex_field(signature, "signature")?;

		let length_prefix = U256::from(sig.len()).to_be_bytes::<32>();

		let mut spliced = Vec::with_capacity(data.len() + 32 + sig.len());
		spliced.extend_from_slice(&data);
		spliced.extend_from_slice(&length_prefix);
		spliced.extend_from_slice(&sig);

		Ok(format!("0x{}", hex::encode(spliced)))
	}

	/// Sign the quote's Permit2 bundle and splice the signature into its
	/// transaction payload. Fails when the quote carries no Permit2 block.
	pub async fn process_quote(
		chain_id: u64,
		quote: &SwapQuote,
		secret: &Secret,
	) -> Result<Permit2Execution, Permit2Error> {
		let permit2 = quote.permit2.as_ref().ok_or(Permit2Error::MissingPermit2)?;

		let signature = Self::sign(chain_id, secret, &permit2.eip712).await?;
		let modified_tx_data = Self::splice_signature(&quote.data, &signature)?;

		Ok(Permit2Execution {
			original_tx_data: quote.data.clone(),
			signature,
			modified_tx_data,
			permit2_data: permit2.clone(),
		})
	}

	/// The quote with `data` replaced by the spliced payload
	pub async fn create_signed_quote(
		chain_id: u64,
		quote: &SwapQuote,
		secret: &Secret,
	) -> Result<SwapQuote, Permit2Error> {
		let execution = Self::process_quote(chain_id, quote, secret).await?;
		let mut signed = quote.clone();
		signed.data = execution.modified_tx_data;
		Ok(signed)
	}

	/// Extract the loggable parts of a Permit2 block
	pub fn info(permit2: &Permit2Data) -> Permit2Info {
		let message_keys = permit2
			.eip712
			.message
			.as_object()
			.map(|map| map.keys().cloned().collect())
			.unwrap_or_default();

		Permit2Info {
			kind: permit2.kind.clone(),
			hash: permit2.hash.clone(),
			primary_type: permit2.eip712.primary_type.clone(),
			domain: permit2.eip712.domain.clone(),
			message_keys,
		}
	}
}

fn decode_hex_field(value: &str, field: &str) -> Result<Vec<u8>, Permit2Error> {
	let stripped = value.strip_prefix("0x").unwrap_or(value);
	hex::decode(stripped).map_err(|_| Permit2Error::InvalidHex {
		field: field.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use omniswap_types::test_utils::sample_quote;

	// Well-known anvil development key, account 0
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

	fn permit_bundle() -> TypedDataBundle {
		TypedDataBundle {
			types: json!({
				"EIP712Domain": [
					{"name": "name", "type": "string"},
					{"name": "chainId", "type": "uint256"},
					{"name": "verifyingContract", "type": "address"}
				],
				"PermitTransferFrom": [
					{"name": "permitted", "type": "TokenPermissions"},
					{"name": "spender", "type": "address"},
					{"name": "nonce", "type": "uint256"},
					{"name": "deadline", "type": "uint256"}
				],
				"TokenPermissions": [
					{"name": "token", "type": "address"},
					{"name": "amount", "type": "uint256"}
				]
			}),
			domain: json!({
				"name": "Permit2",
				"chainId": 1,
				"verifyingContract": "0x000000000022D473030F116dDEE9F6B43aC78BA3"
			}),
			message: json!({
				"permitted": {
					"token": "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
					"amount": "1000000000000000000"
				},
				"spender": "0x0000000000001fF3684f28c67538d4D072C22734",
				"nonce": "0",
				"deadline": "1900000000"
			}),
			primary_type: "PermitTransferFrom".to_string(),
		}
	}

	fn permit2_quote() -> SwapQuote {
		let mut quote = sample_quote("0x", "1000");
		quote.permit2 = Some(Permit2Data {
			kind: "Permit2".to_string(),
			hash: "0x1234".to_string(),
			eip712: permit_bundle(),
		});
		quote
	}

	#[test]
	fn splice_is_byte_exact() {
		let signature = format!("0x{}", "aa".repeat(65));
		let spliced = Permit2Signer::splice_signature("0xabcd", &signature).unwrap();

		// 0x41 == 65, padded to a 32-byte big-endian word
		let expected = format!("0xabcd{}41{}", "00".repeat(31), "aa".repeat(65));
		assert_eq!(spliced, expected);
	}

	#[test]
	fn splice_length_arithmetic_holds() {
		let signature = format!("0x{}", "bb".repeat(65));
		let spliced = Permit2Signer::splice_signature("0xdeadbeef", &signature).unwrap();

		let original = 4usize;
		let spliced_bytes = (spliced.len() - 2) / 2;
		assert_eq!(spliced_bytes, original + 32 + 65);

		// the 32 bytes after the original data decode as the signature length
		let hex_body = &spliced[2..];
		let prefix = &hex_body[original * 2..(original + 32) * 2];
		let decoded = u64::from_str_radix(prefix.trim_start_matches('0'), 16).unwrap();
		assert_eq!(decoded, 65);
	}

	#[test]
	fn splice_rejects_bad_hex() {
		assert!(matches!(
			Permit2Signer::splice_signature("0xzz", "0xaa"),
			Err(Permit2Error::InvalidHex { .. })
		));
	}

	#[tokio::test]
	async fn signature_recovers_to_signing_account() {
		let secret = Secret::from(DEV_KEY);
		let bundle = permit_bundle();

		let signature_hex = Permit2Signer::sign(1, &secret, &bundle).await.unwrap();
		let sig_bytes = decode_hex_field(&signature_hex, "signature").unwrap();
		assert_eq!(sig_bytes.len(), 65);

		let typed: TypedData = serde_json::from_value(json!({
			"types": bundle.types,
			"domain": bundle.domain,
			"primaryType": bundle.primary_type,
			"message": bundle.message,
		}))
		.unwrap();
		let digest = typed.eip712_signing_hash().unwrap();

		let signature = alloy::primitives::Signature::from_raw(&sig_bytes).unwrap();
		let recovered = signature.recover_address_from_prehash(&digest).unwrap();
		assert_eq!(recovered, DEV_ADDRESS.parse::<alloy::primitives::Address>().unwrap());
	}

	#[tokio::test]
	async fn process_quote_round_trips_original_data() {
		let secret = Secret::from(DEV_KEY);
		let quote = permit2_quote();

		let execution = Permit2Signer::process_quote(1, &quote, &secret).await.unwrap();
		assert_eq!(execution.original_tx_data, quote.data);

		// stripping the signature and the 32-byte length prefix recovers the
		// original payload
		let sig_hex_len = execution.signature.len() - 2;
		let stripped_len = execution.modified_tx_data.len() - sig_hex_len - 64;
		assert_eq!(&execution.modified_tx_data[..stripped_len], quote.data);
	}

	#[tokio::test]
	async fn process_quote_requires_permit2_block() {
		let secret = Secret::from(DEV_KEY);
		let quote = sample_quote("0x", "1000");
		assert!(matches!(
			Permit2Signer::process_quote(1, &quote, &secret).await,
			Err(Permit2Error::MissingPermit2)
		));
	}

	#[tokio::test]
	async fn signed_quote_carries_spliced_payload() {
		let secret = Secret::from(DEV_KEY);
		let quote = permit2_quote();

		let signed = Permit2Signer::create_signed_quote(1, &quote, &secret)
			.await
			.unwrap();
		assert_ne!(signed.data, quote.data);
		assert!(signed.data.starts_with(&quote.data));
	}

	#[test]
	fn info_extracts_message_keys() {
		let quote = permit2_quote();
		let info = Permit2Signer::info(quote.permit2.as_ref().unwrap());
		assert_eq!(info.primary_type, "PermitTransferFrom");
		assert!(info.message_keys.contains(&"spender".to_string()));
		assert!(info.message_keys.contains(&"deadline".to_string()));
	}
}
