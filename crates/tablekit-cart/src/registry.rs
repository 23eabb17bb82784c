//! Closed enumerations persisted in cart records.
//!
//! Each enum maps to exactly one wire string. Parsing accepts the wire string
//! and any listed alias and rejects everything else, so an unexpected value
//! read back from the store fails loudly instead of flowing through as an
//! arbitrary string.

use std::fmt;

use thiserror::Error;

/// Parsing a registry value failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The string is not a known value of the enumeration.
    #[error("unknown {kind} value '{value}'")]
    Unknown {
        /// Name of the enumeration.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

macro_rules! registry_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`\"", $wire, "\"`")]
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The persisted form.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = RegistryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(RegistryError::Unknown {
                        kind: stringify!($name),
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Cart lifecycle
// ---------------------------------------------------------------------------

registry_enum! {
    /// Fulfilment flavour of a cart.
    #[derive(Default)]
    pub enum CartType {
        #[default]
        Unspecified => "Unspecified",
        Delivery => "DELIVERY",
        Dining => "DINING",
        GroupOrdering => "GROUP_ORDERING",
    }
}

registry_enum! {
    /// Surface the user opened the cart from.
    #[derive(Default)]
    pub enum CartLandingSource {
        #[default]
        Unspecified => "Unspecified",
        Menu => "Menu",
        Express => "Express",
        Aerobar => "Aerobar",
        IntercityMenu => "IntercityMenu",
        IntercityExpress => "IntercityExpress",
        IntercityAerobar => "IntercityAerobar",
        Healthy => "Healthy",
    }
}

registry_enum! {
    /// Stage of a single cart.
    #[derive(Default)]
    pub enum CartPhase {
        #[default]
        Unspecified => "Unspecified",
        Initialise => "Initialise",
        Build => "Build",
        Checkout => "Checkout",
    }
}

registry_enum! {
    /// Stage of a group order.
    #[derive(Default)]
    pub enum GroupPhase {
        #[default]
        Unspecified => "Unspecified",
        CreateGroup => "CreateGroup",
        ValidateGroup => "ValidateGroup",
        GetGroupOrderPreview => "GetGroupOrderPreview",
        AddMemberToGroup => "AddMemberToGroup",
    }
}

registry_enum! {
    /// Request metadata header names.
    pub enum ContextMetadata {
        AppRequestUuid => "app-request-uuid",
        VerifyActiveDuplicateOrder => "verify-active-duplicate-order",
        RiderAppInstalled => "rider-app-installed",
        IsZoman => "is-zoman",
        ShadowRequest => "x-shadow-request",
        ShadowRequestId => "x-shadow-request-id",
        TestFlow => "x-test-flow",
        LandingSource => "x-landing-source",
        BenchmarkingTraffic => "benchmarking_traffic",
        IsGatewayRequestSource => "is-gateway-request-source",
    }
}

registry_enum! {
    /// Keys of the per-session token map.
    #[derive(Default)]
    pub enum CartSessionTokenKey {
        #[default]
        Unspecified => "Unspecified",
        BenefitsToken => "BenefitsToken",
        ChargesComputationId => "ChargeComputationId",
    }
}

registry_enum! {
    /// What changed the cart.
    #[derive(Default)]
    pub enum CartModificationType {
        #[default]
        Unspecified => "Unspecified",
        AddItem => "AddItem",
        AddItemMultiStore => "AddItemMultiStore",
        RescueOrder => "RescueOrder",
    }
}

impl CartSessionTokenKey {
    /// `true` for the placeholder key.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        *self == Self::Unspecified
    }
}

impl CartModificationType {
    /// `true` when no modification was recorded.
    #[must_use]
    pub fn is_unspecified(&self) -> bool {
        *self == Self::Unspecified
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

registry_enum! {
    /// Whether a computation runs on the request path.
    #[derive(Default)]
    pub enum InvocationMode {
        #[default]
        Unspecified => "Unspecified",
        Foreground => "Foreground",
        Background => "Background",
    }
}

registry_enum! {
    /// Caller that triggered a computation.
    #[derive(Default)]
    pub enum InvocationEntityId {
        #[default]
        Unspecified => "Unspecified",
        SimilarCarts => "SimilarCarts",
        OfferWall => "OfferWall",
        BenefitServiceGetDiscounts => "BenefitServiceGetDiscounts",
        ReplacementMealSimilarRes => "ReplacementMealSimilarRes",
    }
}

registry_enum! {
    /// Why a computation was triggered. The unspecified reason persists as
    /// an empty string.
    #[derive(Default)]
    pub enum InvocationReason {
        #[default]
        Unspecified => "" | "Unspecified",
        GtCalculationPostBenefitSuggestion => "GTCalculationPostBenefitSuggestion",
    }
}

registry_enum! {
    /// Kind of caller that triggered a computation.
    #[derive(Default)]
    pub enum InvocationEntityType {
        #[default]
        Unspecified => "Unspecified",
        Customer => "Customer",
        System => "System",
    }
}

registry_enum! {
    /// Which totals a computation produces.
    #[derive(Default)]
    pub enum ComputationMode {
        #[default]
        Unspecified => "Unspecified",
        FinalValueCalculation => "FinalValueCalculation",
        UpdateGroupOrderMemberCatalog => "UpdateGroupOrderMemberCatalog",
        UpdateGroupOrderAggregatedCatalog => "UpdateGroupOrderAggregatedCatalog",
    }
}

// ---------------------------------------------------------------------------
// Client capabilities
// ---------------------------------------------------------------------------

registry_enum! {
    /// Features a client declares support for.
    #[derive(Default)]
    pub enum FeatureSupportKey {
        #[default]
        Unspecified => "Unspecified",
        ZomatoMoneyV2 => "ZomatoMoneyV2",
        CartV19 => "CartV19",
        UserSalt => "UserSalt",
        BxgyDeduplication => "BXGYDeduplication",
        NonPromoItemsBlockedForOffers => "NonPromoItemsBlockedForOffers",
        SaltForSubtotalFix => "SaltForSubtotalFix",
        NewBrandReferralFlow => "NewBrandReferralFlow",
        StepperOffer => "StepperOffer",
        WebRouteApi => "WebRouteAPI",
        Freebie => "Freebie",
        NewSaltOffers => "NewSaltOffers",
        BaseDishDiscount => "BaseDishDiscount",
        ShowRawFeatureOnCart => "ShowRawFeatureOnCart",
        Deal => "Deal",
        CartRoundOff => "CartRoundOff",
        AutoApplyZcredits => "AutoApplyZcredits",
        CorporateVouchers => "CorporateVouchers",
        CombinedAdditiveOffers => "CombinedAdditiveVouchers",
        Gold => "Gold",
        GoldSubscription => "GoldSubsription",
        EnterpriseMealWallet => "EnterpriseMealWallet",
        PremiumCheckout => "PremiumCheckout",
        GoldLite => "GoldLite",
        Brunch => "Brunch",
        AddOnCustomizationStepper => "AddOnCustomizationStepper",
        UnifiedBalance => "UnifiedBalance",
        TimedOffer => "TimedOffer",
        EnterpriseLimit => "EnterpriseLimit",
        TimedOfferBackgroundMode => "TimedOfferBackgroundMode",
        PaymentsBasedPromo => "PaymentsBasedPromo",
        Tip => "Tip",
        FeedingIndiaV2 => "FeedingIndiaV2",
        UnifiedZBalancePopupV2 => "UnifiedZBalancePopupV2",
        PriorityDeliveryV2 => "PriorityDeliveryV2",
        PayAfterOrder => "PayAfterOrder",
        CarbonOffsetFee => "CarbonOffsetFee",
        RiderWelfareFund => "RiderWelfareFund",
        VegModeV2 => "VegCharge",
        FeedingIndiaRobinhood => "FeedingIndiaRobinhood",
        PayAfterOrderV2 => "PayAfterOrderV2",
        PostOrderPayment => "PostOrderPayment",
        MultipleGroupOrderSupport => "MultipleGroupOrderSupport",
        DynamicDietaryTag => "DynamicDietaryTag",
    }
}

registry_enum! {
    /// Banner or widget that led to the cart. The unspecified entry point
    /// persists as an empty string.
    #[derive(Default)]
    pub enum EntryPointType {
        #[default]
        Unspecified => "" | "unspecified",
        SearchLargeOrderBanner => "searchLargeOrderBanner",
    }
}
